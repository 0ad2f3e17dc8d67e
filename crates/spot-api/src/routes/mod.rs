//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/prices` - 가격 구간 조회 (evcc 형식)
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/openapi.json` - OpenAPI 문서

pub mod health;
pub mod prices;

pub use health::{health_router, ComponentStatus, HealthResponse, LivenessResponse};
pub use prices::{prices_router, PriceEntry, PriceQuery};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(prices_router())
        .merge(health_router())
        .merge(crate::openapi::openapi_router())
}
