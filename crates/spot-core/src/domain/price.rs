//! 가격 샘플 및 저장 포인트 모델.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::area::AreaTag;
use crate::error::{SpotError, SpotResult};
use crate::types::{TaxRate, UnitTaxTransform};

/// 단일 시장 가격 (EUR/MWh).
///
/// 지속 시간 정보는 없으며, 시각과 값만 가집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    /// 정산 구간 시작 시각 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 가격 (EUR/MWh)
    pub value: Decimal,
}

impl RawSample {
    pub fn new(timestamp: DateTime<Utc>, value: Decimal) -> Self {
        Self { timestamp, value }
    }
}

/// 가격 유형 구분자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    /// 전일(day-ahead) 시장 가격
    #[default]
    DayAhead,
}

impl PriceType {
    /// 저장소 태그 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::DayAhead => "day_ahead",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 저장 포인트의 식별 키.
///
/// 동일한 키로 다시 기록하면 기존 포인트를 덮어씁니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey {
    pub area: AreaTag,
    pub price_type: PriceType,
    pub timestamp: DateTime<Utc>,
}

/// 저장소에 기록되는 가격 포인트.
///
/// 세금 포함 값은 저장하지 않습니다. 세금은 조회 시점에 적용됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPoint {
    pub area: AreaTag,
    pub price_type: PriceType,
    pub timestamp: DateTime<Utc>,
    /// 원본 가격 (EUR/MWh)
    pub price_eur_mwh: Decimal,
    /// 변환 가격 (EUR/kWh)
    pub price_eur_kwh: Decimal,
}

impl StoredPoint {
    /// 원본 샘플에서 전일 가격 포인트를 생성합니다.
    pub fn day_ahead(area: &AreaTag, sample: &RawSample, transform: &UnitTaxTransform) -> Self {
        let price = transform.convert(sample.value, TaxRate::ZERO);
        Self {
            area: area.clone(),
            price_type: PriceType::DayAhead,
            timestamp: sample.timestamp,
            price_eur_mwh: price.base,
            price_eur_kwh: price.converted,
        }
    }

    /// 식별 키를 반환합니다.
    pub fn key(&self) -> PointKey {
        PointKey {
            area: self.area.clone(),
            price_type: self.price_type,
            timestamp: self.timestamp,
        }
    }

    /// 저장된 원본 값을 샘플로 되돌립니다.
    pub fn to_sample(&self) -> RawSample {
        RawSample::new(self.timestamp, self.price_eur_mwh)
    }
}

/// 한 지역의 오름차순 샘플 시퀀스 (저장소 조회 결과).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSeries {
    pub area: AreaTag,
    pub samples: Vec<RawSample>,
}

/// 반열린 시간 구간 `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// 새 구간을 생성합니다. `start < end`여야 합니다.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> SpotResult<Self> {
        if start >= end {
            return Err(SpotError::InvalidRange {
                start,
                end,
                reason: "start는 end보다 앞서야 합니다".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// 기준 시각 전후로 구간을 생성합니다.
    pub fn around(
        now: DateTime<Utc>,
        lookback: chrono::TimeDelta,
        lookahead: chrono::TimeDelta,
    ) -> SpotResult<Self> {
        match (
            now.checked_sub_signed(lookback),
            now.checked_add_signed(lookahead),
        ) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(SpotError::InvalidRange {
                start: now,
                end: now,
                reason: format!("표현 가능한 시각 범위 초과: -{} / +{}", lookback, lookahead),
            }),
        }
    }

    /// 시각이 구간에 포함되는지 확인합니다.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}
