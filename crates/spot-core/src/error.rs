//! 가격 수집/조회 시스템의 에러 타입.
//!
//! 이 모듈은 도메인 계층 전반에서 사용되는 에러 타입을 정의합니다.
//! 청크/요청 단위의 일시적 실패는 각 crate에서 별도로 다루며,
//! 여기에는 설정 오류와 계약 위반(프로그래밍 오류)만 정의됩니다.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpotError {
    /// 설정 에러 (필수 값 누락, 음수 세율 등)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 시간 범위 (start >= end 또는 청크 폭 <= 0)
    #[error("잘못된 시간 범위: {start} ~ {end} ({reason})")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reason: String,
    },

    /// 오름차순으로 정렬되지 않은 입력
    #[error("정렬되지 않은 입력: index {index}의 시각 {timestamp}이(가) 이전 시각 {previous} 이후가 아닙니다")]
    UnsortedInput {
        index: usize,
        previous: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// 잘못된 지역 코드
    #[error("잘못된 지역 코드: {0}")]
    InvalidArea(String),
}

/// 도메인 작업을 위한 Result 타입.
pub type SpotResult<T> = Result<T, SpotError>;

impl From<config::ConfigError> for SpotError {
    fn from(err: config::ConfigError) -> Self {
        SpotError::Config(err.to_string())
    }
}
