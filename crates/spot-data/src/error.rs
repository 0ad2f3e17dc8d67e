//! 데이터 모듈 오류 타입.

use spot_core::SpotError;
use thiserror::Error;

/// 데이터 소스 / 저장소 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 연결 오류 (전송 계층 실패, 타임아웃 포함)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// 저장소 조회 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 저장소 쓰기 오류
    #[error("Write error: {0}")]
    WriteError(String),

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::ConnectionError(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<quick_xml::DeError> for DataError {
    fn from(err: quick_xml::DeError) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<SpotError> for DataError {
    fn from(err: SpotError) -> Self {
        match err {
            SpotError::Config(msg) => DataError::ConfigError(msg),
            other => DataError::InvalidData(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
