//! 에러 타입 정의.

use spot_core::SpotError;
use spot_data::DataError;
use thiserror::Error;

/// Collector 에러 타입
///
/// 청크 단위 실패는 에러가 아니라 `ChunkOutcome::Failed`로 기록됩니다.
/// 여기에는 실행 전체를 중단시키는 에러만 있습니다.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러 (필수 값 누락 등)
    #[error("Configuration error: {0}")]
    Config(String),

    /// 잘못된 요청 (시간 범위, 지역 코드 등)
    #[error("Invalid request: {0}")]
    InvalidRequest(#[source] SpotError),

    /// 데이터 소스 / 저장소 초기화 에러
    #[error("Data source error: {0}")]
    DataSource(#[from] DataError),
}

impl CollectorError {
    /// 재시도해도 해결되지 않는 에러인지 확인 (데몬 루프 중단 기준)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::DataSource(DataError::ConfigError(_))
        )
    }
}

impl From<SpotError> for CollectorError {
    fn from(err: SpotError) -> Self {
        match err {
            SpotError::Config(msg) => Self::Config(msg),
            other => Self::InvalidRequest(other),
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
