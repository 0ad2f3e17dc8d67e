//! 전일 가격 조회 HTTP 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 저장된 가격을 연속 구간으로 재구성하는 조회 서비스
//! - Axum 기반 REST API (`/prices`, `/health`)
//! - OpenAPI 문서
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`services`]: 가격 조회 서비스
//! - [`routes`]: REST API 엔드포인트
//! - [`openapi`]: OpenAPI 문서

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiErrorResponse, ApiResult, QueryError};
pub use routes::*;
pub use services::QueryService;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
