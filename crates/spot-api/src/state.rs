//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 상태는 요청 간에 불변이며 Arc로 래핑되어 공유됩니다.

use chrono::{DateTime, Utc};
use spot_core::{TaxRate, UnitTaxTransform};
use spot_data::PriceStore;
use std::sync::Arc;

use crate::services::QueryService;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 가격 저장소 (readiness 확인용)
    pub store: Arc<dyn PriceStore>,

    /// 가격 조회 서비스
    pub query_service: QueryService,

    /// `tax` 파라미터가 없을 때 적용할 세율
    pub default_tax: TaxRate,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(store: Arc<dyn PriceStore>, default_tax: TaxRate) -> Self {
        Self {
            query_service: QueryService::new(store.clone()),
            store,
            default_tax,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 조회 경로 단위 변환 설정.
    pub fn with_transform(mut self, transform: UnitTaxTransform) -> Self {
        self.query_service = self.query_service.with_transform(transform);
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// 메모리 저장소를 사용하는 테스트용 상태.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> (AppState, Arc<spot_data::MemoryPriceStore>) {
    let store = Arc::new(spot_data::MemoryPriceStore::new());
    (AppState::new(store.clone(), TaxRate::ZERO), store)
}
