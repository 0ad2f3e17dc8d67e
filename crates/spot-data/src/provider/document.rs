//! ENTSO-E XML 문서 파싱.
//!
//! 전일 가격 응답은 `Publication_MarketDocument`입니다:
//!
//! ```text
//! TimeSeries
//!   └─ Period
//!        ├─ timeInterval { start, end }   (예: 2024-01-01T23:00Z)
//!        ├─ resolution                   (PT15M, PT60M, ...)
//!        └─ Point { position, price.amount } *
//! ```
//!
//! curveType A03 응답은 직전과 같은 가격의 Point를 생략하므로, 빠진 position은
//! 직전 가격으로 채웁니다. 조회 결과가 없으면 `Acknowledgement_MarketDocument`
//! (reason code 999)가 반환되며, 이는 에러가 아닌 빈 결과입니다.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use spot_core::RawSample;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{DataError, Result};

/// "조회 결과 없음" reason code.
pub const NO_DATA_REASON_CODE: &str = "999";

/// 파싱된 ENTSO-E 응답.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketDocument {
    /// 시각 오름차순 가격 샘플
    Prices(Vec<RawSample>),
    /// 데이터 없음 (사유 텍스트)
    NoData(String),
}

#[derive(Debug, Deserialize)]
struct PublicationXml {
    #[serde(rename = "TimeSeries", default)]
    time_series: Vec<TimeSeriesXml>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesXml {
    #[serde(rename = "Period", default)]
    periods: Vec<PeriodXml>,
}

#[derive(Debug, Deserialize)]
struct PeriodXml {
    #[serde(rename = "timeInterval")]
    time_interval: TimeIntervalXml,
    resolution: String,
    #[serde(rename = "Point", default)]
    points: Vec<PointXml>,
}

#[derive(Debug, Deserialize)]
struct TimeIntervalXml {
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct PointXml {
    position: String,
    #[serde(rename = "price.amount")]
    price_amount: String,
}

#[derive(Debug, Deserialize)]
struct AcknowledgementXml {
    #[serde(rename = "Reason", default)]
    reasons: Vec<ReasonXml>,
}

#[derive(Debug, Deserialize)]
struct ReasonXml {
    code: String,
    #[serde(default)]
    text: Option<String>,
}

/// ENTSO-E 응답 본문을 파싱합니다.
pub fn parse_document(xml: &str) -> Result<MarketDocument> {
    if xml.contains("Acknowledgement_MarketDocument") {
        let ack: AcknowledgementXml = quick_xml::de::from_str(xml)?;
        return acknowledgement_to_document(ack);
    }

    let doc: PublicationXml = quick_xml::de::from_str(xml)?;

    // 여러 TimeSeries에 같은 시각이 있으면 먼저 나온 값을 사용
    let mut prices: BTreeMap<DateTime<Utc>, Decimal> = BTreeMap::new();
    for period in doc.time_series.iter().flat_map(|s| &s.periods) {
        expand_period(period, &mut prices)?;
    }

    Ok(MarketDocument::Prices(
        prices
            .into_iter()
            .map(|(timestamp, value)| RawSample::new(timestamp, value))
            .collect(),
    ))
}

fn acknowledgement_to_document(ack: AcknowledgementXml) -> Result<MarketDocument> {
    let describe = |r: &ReasonXml| {
        format!(
            "[{}] {}",
            r.code.trim(),
            r.text.as_deref().unwrap_or("").trim()
        )
    };

    if let Some(reason) = ack
        .reasons
        .iter()
        .find(|r| r.code.trim() == NO_DATA_REASON_CODE)
    {
        return Ok(MarketDocument::NoData(describe(reason)));
    }

    let message = ack
        .reasons
        .iter()
        .map(describe)
        .collect::<Vec<_>>()
        .join("; ");
    Err(DataError::FetchError(format!(
        "ENTSO-E 요청 거부: {}",
        if message.is_empty() { "사유 없음" } else { &message }
    )))
}

fn expand_period(period: &PeriodXml, out: &mut BTreeMap<DateTime<Utc>, Decimal>) -> Result<()> {
    let start = parse_entsoe_time(&period.time_interval.start)?;
    let end = parse_entsoe_time(&period.time_interval.end)?;
    let resolution = parse_resolution(&period.resolution)?;

    if end <= start {
        return Err(DataError::InvalidData(format!(
            "잘못된 timeInterval: {} ~ {}",
            period.time_interval.start, period.time_interval.end
        )));
    }

    let slots = (end - start).num_seconds() / resolution.num_seconds();

    let mut points: BTreeMap<i64, Decimal> = BTreeMap::new();
    for point in &period.points {
        let position: i64 = point.position.trim().parse().map_err(|_| {
            DataError::ParseError(format!("잘못된 position: {}", point.position))
        })?;
        if position < 1 {
            return Err(DataError::InvalidData(format!(
                "position은 1부터 시작합니다: {}",
                position
            )));
        }
        points.insert(position, parse_price(&point.price_amount)?);
    }

    let mut last: Option<Decimal> = None;
    for position in 1..=slots {
        if let Some(price) = points.get(&position) {
            last = Some(*price);
        }
        let Some(price) = last else { continue };

        let timestamp = i32::try_from(position - 1)
            .ok()
            .and_then(|offset| resolution.checked_mul(offset))
            .and_then(|delta| start.checked_add_signed(delta))
            .ok_or_else(|| DataError::InvalidData(format!("position 범위 초과: {}", position)))?;
        out.entry(timestamp).or_insert(price);
    }

    Ok(())
}

/// ENTSO-E 시각 문자열(`2024-01-01T23:00Z`)을 파싱합니다.
pub fn parse_entsoe_time(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%MZ")
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|e| DataError::ParseError(format!("잘못된 시각 '{}': {}", value, e)))
}

/// ISO 8601 기간(`PT15M`, `PT60M`, `PT1H`, `P1D`)을 파싱합니다.
pub fn parse_resolution(value: &str) -> Result<TimeDelta> {
    let value = value.trim();
    let invalid = || DataError::InvalidData(format!("지원하지 않는 resolution: {}", value));

    let (time_part, rest) = match value.strip_prefix("PT") {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('P').ok_or_else(invalid)?),
    };
    let mut chars = rest.chars();
    let unit = chars.next_back().ok_or_else(invalid)?;
    let amount: i64 = chars.as_str().parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let delta = match (time_part, unit) {
        (true, 'M') => TimeDelta::try_minutes(amount),
        (true, 'H') => TimeDelta::try_hours(amount),
        (false, 'D') => TimeDelta::try_days(amount),
        _ => None,
    };
    delta.ok_or_else(invalid)
}

fn parse_price(value: &str) -> Result<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| DataError::ParseError(format!("잘못된 가격 '{}': {}", value, e)))
}
