//! # Spot Core
//!
//! 전일(day-ahead) 전력 가격 수집/조회 시스템의 핵심 도메인 모델을 제공합니다.
//!
//! 이 크레이트는 수집 경로와 조회 경로에서 공통으로 사용되는 타입을 제공합니다:
//! - 가격 샘플, 저장 포인트, 지역 태그
//! - 시간 범위 청크 분할 (백필)
//! - 가격 구간 재구성 (종료 시각 유도)
//! - 단위/세금 변환
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
