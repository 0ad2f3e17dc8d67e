//! 전일 전력 가격 수집기.
//!
//! 이 crate는 ENTSO-E에서 가격을 가져와 InfluxDB에 기록하는 바이너리를 제공합니다:
//! - 롤링 임포트 (최근 7일 ~ 향후 2일)
//! - 과거 데이터 백필 (청크 단위, 드라이런 지원)
//! - 데몬 모드 (주기적 롤링 임포트)

pub mod config;
pub mod error;
pub mod modules;
pub mod summary;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use summary::{ChunkOutcome, ChunkResult, RunSummary};
