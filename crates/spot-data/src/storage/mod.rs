//! 가격 시계열 저장소.
//!
//! - `InfluxStore`: InfluxDB v2 HTTP API (line protocol 쓰기, Flux 조회)
//! - `MemoryPriceStore`: 프로세스 내 저장소 (테스트 및 드라이런용)
//!
//! 모든 구현은 `(country, price_type, timestamp)`를 식별 키로 사용하며,
//! 같은 키로 다시 쓰면 기존 값을 덮어씁니다.

pub mod influx;
pub mod memory;

pub use influx::InfluxStore;
pub use memory::MemoryPriceStore;

use async_trait::async_trait;
use spot_core::{AreaTag, PriceType, SampleSeries, StoredPoint, TimeWindow};

use crate::error::Result;

/// 측정(measurement) 이름.
pub const MEASUREMENT: &str = "electricity_price";
/// 지역 태그 키.
pub const TAG_COUNTRY: &str = "country";
/// 가격 유형 태그 키.
pub const TAG_PRICE_TYPE: &str = "price_type";
/// 원본 가격 필드 (EUR/MWh).
pub const FIELD_PRICE_EUR_MWH: &str = "price_eur_mwh";
/// 변환 가격 필드 (EUR/kWh).
pub const FIELD_PRICE_EUR_KWH: &str = "price_eur_kwh";

/// 시계열 조회 조건.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesQuery {
    /// 지역 필터 (`None`이면 전체 지역)
    pub area: Option<AreaTag>,
    pub price_type: PriceType,
    /// 조회 구간 `[start, end)`
    pub window: TimeWindow,
}

impl SeriesQuery {
    /// 전일 가격 조회 조건을 생성합니다.
    pub fn day_ahead(area: Option<AreaTag>, window: TimeWindow) -> Self {
        Self {
            area,
            price_type: PriceType::DayAhead,
            window,
        }
    }
}

/// 가격 포인트 저장소.
///
/// 구현체는 여러 작업에서 동시에 호출될 수 있으며, 각 호출이 사용하는
/// 연결/요청 자원은 호출이 끝나면 성공/실패와 무관하게 해제되어야 합니다.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// 저장소 이름 (로그용).
    fn name(&self) -> &str;

    /// 포인트를 기록하고 기록한 개수를 반환합니다.
    async fn write_points(&self, points: &[StoredPoint]) -> Result<usize>;

    /// 조건에 맞는 원본 가격(EUR/MWh)을 지역별 오름차순 시퀀스로 조회합니다.
    async fn read_series(&self, query: &SeriesQuery) -> Result<Vec<SampleSeries>>;

    /// 저장소 연결 상태를 확인합니다.
    async fn ping(&self) -> Result<()>;
}
