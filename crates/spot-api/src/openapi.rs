//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성하고
//! `/openapi.json` 경로로 제공합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::error::ApiErrorResponse;
use crate::routes::{ComponentStatus, HealthResponse, LivenessResponse, PriceEntry};

/// Spot Price API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Spot Price API",
        description = "ENTSO-E 전일 전력 가격을 evcc 호환 구간 형식으로 제공합니다.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    tags(
        (name = "prices", description = "가격 - 전일 가격 구간 조회"),
        (name = "health", description = "헬스 체크 - 서버 상태 확인")
    ),
    components(
        schemas(
            PriceEntry,
            HealthResponse,
            LivenessResponse,
            ComponentStatus,
            ApiErrorResponse,
        )
    ),
    paths(
        crate::routes::prices::get_prices,
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
    )
)]
pub struct ApiDoc;

/// OpenAPI JSON 핸들러.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// OpenAPI 문서 라우터 생성.
pub fn openapi_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/openapi.json", get(openapi_json))
}
