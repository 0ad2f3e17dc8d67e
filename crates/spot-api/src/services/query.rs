//! 가격 조회 서비스.
//!
//! 저장소에서 원본 가격(EUR/MWh)을 읽어 지역별로 연속 구간을 재구성하고,
//! 조회 경로 단위(ct/kWh)와 세율을 적용해 소수점 2자리로 반올림합니다.

use spot_core::{
    reconstruct_intervals, round_price, AreaTag, PriceInterval, TaxRate, TimeWindow,
    UnitTaxTransform, DEFAULT_SETTLEMENT_PERIOD,
};
use spot_data::{PriceStore, SeriesQuery};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::QueryError;

/// 가격 조회 서비스.
///
/// 저장소 핸들과 변환 설정만 가지며 요청 간 공유되는 가변 상태는 없습니다.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn PriceStore>,
    transform: UnitTaxTransform,
}

impl QueryService {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self {
            store,
            transform: UnitTaxTransform::new(),
        }
    }

    /// 단위 변환 설정
    pub fn with_transform(mut self, transform: UnitTaxTransform) -> Self {
        self.transform = transform;
        self
    }

    /// 구간 내 가격을 조회합니다.
    ///
    /// 지역 필터가 없으면 지역마다 따로 재구성한 뒤 지역 코드 순서로 이어 붙입니다.
    /// 데이터가 없으면 빈 목록을 반환합니다.
    pub async fn fetch_prices(
        &self,
        area: Option<&AreaTag>,
        tax_rate: TaxRate,
        window: TimeWindow,
    ) -> Result<Vec<PriceInterval>, QueryError> {
        let query = SeriesQuery::day_ahead(area.cloned(), window);

        let series = self.store.read_series(&query).await.map_err(|e| {
            error!(store = self.store.name(), error = %e, "가격 조회 실패");
            QueryError::from(e)
        })?;

        if area.is_none() && series.len() > 1 {
            warn!(
                areas = ?series.iter().map(|s| s.area.country_code()).collect::<Vec<_>>(),
                "지역 필터 없이 여러 지역이 조회되어 지역별로 구간을 재구성합니다"
            );
        }

        let mut prices = Vec::with_capacity(series.iter().map(|s| s.samples.len()).sum());
        for s in &series {
            let intervals = reconstruct_intervals(&s.samples, DEFAULT_SETTLEMENT_PERIOD)
                .map_err(QueryError::InvalidSeries)?;
            prices.extend(intervals.into_iter().map(|interval| {
                interval.map_value(|v| round_price(self.transform.to_consumer(v, tax_rate)))
            }));
        }

        debug!(
            area = ?area.map(AreaTag::country_code),
            tax = %tax_rate,
            count = prices.len(),
            "가격 조회 완료"
        );

        Ok(prices)
    }
}
