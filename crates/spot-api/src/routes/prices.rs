//! 가격 조회 endpoint.
//!
//! evcc 호환 형식(`[{start, end, value}]`)으로 현재 시각 전후 48시간의
//! 가격 구간을 반환합니다.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spot_core::{AreaTag, PriceInterval, TaxRate, TimeWindow};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiResult, QueryError};
use crate::state::AppState;

/// 기본 조회 범위 (현재 시각 기준 전후).
pub const DEFAULT_QUERY_SPAN: TimeDelta = TimeDelta::hours(48);

/// 기준 시각 전후 [`DEFAULT_QUERY_SPAN`] 조회 구간 `[now - 48h, now + 48h)`.
pub fn default_window(now: DateTime<Utc>) -> Result<TimeWindow, QueryError> {
    TimeWindow::around(now, DEFAULT_QUERY_SPAN, DEFAULT_QUERY_SPAN)
        .map_err(|e| QueryError::InvalidInput(e.to_string()))
}

/// 가격 조회 파라미터.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PriceQuery {
    /// 지역 코드 필터 (예: BE, DE_LU, NL)
    pub country: Option<String>,
    /// 세율 (예: 0.06). 없으면 서버 기본값
    pub tax: Option<String>,
}

/// 가격 구간 (evcc 형식).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceEntry {
    /// 구간 시작 (UTC, `Z` 접미사)
    pub start: String,
    /// 구간 종료 (UTC, `Z` 접미사)
    pub end: String,
    /// 가격 (ct/kWh, 소수점 2자리)
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub value: Decimal,
}

impl From<PriceInterval> for PriceEntry {
    fn from(interval: PriceInterval) -> Self {
        Self {
            start: interval.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            end: interval.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            value: interval.value,
        }
    }
}

impl PriceQuery {
    fn area(&self) -> Result<Option<AreaTag>, QueryError> {
        match self.country.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(code) => AreaTag::new(code)
                .map(Some)
                .map_err(|e| QueryError::InvalidInput(e.to_string())),
        }
    }

    fn tax_rate(&self, default: TaxRate) -> Result<TaxRate, QueryError> {
        match self.tax.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw
                .parse::<TaxRate>()
                .map_err(|e| QueryError::InvalidInput(e.to_string())),
        }
    }
}

/// 가격 조회.
///
/// GET /prices
#[utoipa::path(
    get,
    path = "/prices",
    tag = "prices",
    params(PriceQuery),
    responses(
        (status = 200, description = "가격 구간 목록", body = Vec<PriceEntry>),
        (status = 400, description = "잘못된 파라미터", body = crate::error::ApiErrorResponse),
        (status = 500, description = "저장소 조회 실패", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_prices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PriceQuery>,
) -> ApiResult<Json<Vec<PriceEntry>>> {
    let area = params.area().map_err(QueryError::into_api_error)?;
    let tax_rate = params
        .tax_rate(state.default_tax)
        .map_err(QueryError::into_api_error)?;
    let window = default_window(Utc::now()).map_err(QueryError::into_api_error)?;

    let prices = state
        .query_service
        .fetch_prices(area.as_ref(), tax_rate, window)
        .await
        .map_err(QueryError::into_api_error)?;

    Ok(Json(prices.into_iter().map(PriceEntry::from).collect()))
}

/// 가격 라우터 생성.
pub fn prices_router() -> Router<Arc<AppState>> {
    Router::new().route("/prices", get(get_prices))
}
