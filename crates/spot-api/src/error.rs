//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use spot_core::SpotError;
use spot_data::DataError;
use thiserror::Error;
use utoipa::ToSchema;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "UPSTREAM_UNAVAILABLE",
///   "message": "Error querying prices: Connection error: ...",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_INPUT", "UPSTREAM_UNAVAILABLE")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    pub timestamp: i64,
}

impl ApiErrorResponse {
    /// 현재 시각 타임스탬프로 에러 생성.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 가격 조회 에러.
#[derive(Debug, Error)]
pub enum QueryError {
    /// 저장소 조회 실패
    #[error("Error querying prices: {0}")]
    UpstreamUnavailable(#[from] DataError),

    /// 잘못된 요청 파라미터
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 저장된 시계열로 구간을 만들 수 없음 (정렬 위반 등)
    #[error("Invalid stored series: {0}")]
    InvalidSeries(#[source] SpotError),
}

impl QueryError {
    /// HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable(_) | Self::InvalidSeries(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidSeries(_) => "INVALID_SERIES",
        }
    }

    /// 핸들러 반환용 튜플로 변환.
    pub fn into_api_error(self) -> (StatusCode, Json<ApiErrorResponse>) {
        (
            self.status_code(),
            Json(ApiErrorResponse::new(self.code(), self.to_string())),
        )
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        self.into_api_error().into_response()
    }
}
