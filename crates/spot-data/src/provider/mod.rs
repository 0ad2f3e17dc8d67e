//! 시장 데이터 Provider 모듈.
//!
//! ## ENTSO-E Transparency Platform
//! - `EntsoeClient`: 전일 가격(documentType A44) 조회 클라이언트 (보안 토큰 필요)
//! - `document`: `Publication_MarketDocument` / `Acknowledgement_MarketDocument` XML 파싱

pub mod document;
pub mod entsoe;

pub use document::{parse_document, MarketDocument};
pub use entsoe::EntsoeClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spot_core::{AreaTag, RawSample};

use crate::error::Result;

/// 전일 가격을 제공하는 시장 데이터 소스.
///
/// 반환되는 샘플은 `[start, end)` 범위 안에 있으며 시각 오름차순입니다.
/// 데이터가 없으면 빈 벡터를 반환합니다 (에러 아님).
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Provider 이름 (로그용).
    fn name(&self) -> &str;

    /// 지역의 전일 가격을 조회합니다 (EUR/MWh).
    async fn fetch_day_ahead(
        &self,
        area: &AreaTag,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawSample>>;
}
