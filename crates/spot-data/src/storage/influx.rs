//! InfluxDB v2 저장소 구현.
//!
//! 쓰기는 `influxdb` crate로 line protocol을 만든 뒤 `/api/v2/write`로 전송하고,
//! 조회는 Flux 쿼리를 `/api/v2/query`로 보내 CSV 응답을 파싱합니다.
//!
//! 공유되는 것은 불변 `reqwest::Client`뿐이며, 각 요청의 응답은 함수가
//! 끝나는 시점(에러 반환 포함)에 해제됩니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use influxdb::{InfluxDbWriteable, Query};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;
use spot_core::{AreaTag, InfluxConfig, RawSample, SampleSeries, StoredPoint};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

use super::{
    PriceStore, SeriesQuery, FIELD_PRICE_EUR_MWH, MEASUREMENT, TAG_COUNTRY, TAG_PRICE_TYPE,
};
use crate::error::{DataError, Result};

/// line protocol 한 줄에 해당하는 레코드.
#[derive(Debug, InfluxDbWriteable)]
struct PriceLine {
    time: DateTime<Utc>,
    #[influxdb(tag)]
    country: String,
    #[influxdb(tag)]
    price_type: String,
    price_eur_mwh: f64,
    price_eur_kwh: f64,
}

impl PriceLine {
    fn from_point(point: &StoredPoint) -> Result<Self> {
        Ok(Self {
            time: point.timestamp,
            country: point.area.country_code().to_string(),
            price_type: point.price_type.as_str().to_string(),
            price_eur_mwh: to_f64(point.price_eur_mwh)?,
            price_eur_kwh: to_f64(point.price_eur_kwh)?,
        })
    }
}

fn to_f64(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| DataError::InvalidData(format!("f64 변환 불가: {}", value)))
}

/// InfluxDB v2 가격 저장소.
#[derive(Clone)]
pub struct InfluxStore {
    client: reqwest::Client,
    config: InfluxConfig,
}

impl InfluxStore {
    /// 새 저장소를 생성합니다. 연결은 요청 시점에 맺어집니다.
    pub fn new(config: &InfluxConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// 대상 버킷 이름.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }
}

/// 포인트 목록을 line protocol 본문으로 인코딩합니다 (ns 정밀도).
pub fn encode_line_protocol(points: &[StoredPoint]) -> Result<String> {
    let mut lines = Vec::with_capacity(points.len());
    for point in points {
        let line = PriceLine::from_point(point)?
            .into_query(MEASUREMENT)
            .build()
            .map_err(|e| DataError::InvalidData(format!("line protocol 생성 실패: {}", e)))?
            .get();
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// 조회 조건으로 Flux 쿼리를 생성합니다.
pub fn build_flux_query(bucket: &str, query: &SeriesQuery) -> String {
    let mut flux = format!(
        "from(bucket: \"{}\")\n  |> range(start: {}, stop: {})\n  |> filter(fn: (r) => r._measurement == \"{}\")\n  |> filter(fn: (r) => r.{} == \"{}\")",
        escape_flux_string(bucket),
        query.window.start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        query.window.end.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        MEASUREMENT,
        TAG_PRICE_TYPE,
        query.price_type.as_str(),
    );

    if let Some(area) = &query.area {
        flux.push_str(&format!(
            "\n  |> filter(fn: (r) => r.{} == \"{}\")",
            TAG_COUNTRY,
            escape_flux_string(area.country_code())
        ));
    }

    flux.push_str(&format!(
        "\n  |> filter(fn: (r) => r._field == \"{}\")\n  |> keep(columns: [\"_time\", \"_value\", \"{}\"])\n  |> group(columns: [\"{}\"])\n  |> sort(columns: [\"_time\"])",
        FIELD_PRICE_EUR_MWH, TAG_COUNTRY, TAG_COUNTRY,
    ));

    flux
}

fn escape_flux_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Default)]
struct CsvColumns {
    time: usize,
    value: usize,
    country: Option<usize>,
    error: Option<usize>,
}

impl CsvColumns {
    fn from_header(record: &csv::StringRecord) -> Option<Self> {
        let find = |name: &str| record.iter().position(|f| f == name);
        let error = find("error");
        match (find("_time"), find("_value")) {
            (Some(time), Some(value)) => Some(Self {
                time,
                value,
                country: find(TAG_COUNTRY),
                error,
            }),
            _ if error.is_some() => Some(Self {
                error,
                ..Default::default()
            }),
            _ => None,
        }
    }
}

/// Flux CSV 응답을 지역별 시퀀스로 파싱합니다.
///
/// 여러 테이블이 헤더 행으로 구분되어 올 수 있으며, `error` 컬럼이 있으면
/// 조회 에러로 처리합니다.
pub fn parse_flux_csv(body: &str, default_area: Option<&AreaTag>) -> Result<Vec<SampleSeries>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut grouped: BTreeMap<AreaTag, Vec<RawSample>> = BTreeMap::new();
    let mut columns: Option<CsvColumns> = None;

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        if let Some(header) = CsvColumns::from_header(&record) {
            columns = Some(header);
            continue;
        }

        let Some(cols) = &columns else {
            return Err(DataError::ParseError(
                "헤더 없이 데이터 행이 도착했습니다".to_string(),
            ));
        };

        if let Some(idx) = cols.error {
            let message = record.get(idx).unwrap_or("").trim();
            if !message.is_empty() {
                return Err(DataError::QueryError(message.to_string()));
            }
        }

        let time = record.get(cols.time).unwrap_or("").trim();
        let value = record.get(cols.value).unwrap_or("").trim();
        if time.is_empty() || value.is_empty() {
            continue;
        }

        let area = match cols.country.and_then(|idx| record.get(idx)) {
            Some(code) if !code.trim().is_empty() => AreaTag::new(code)?,
            _ => match default_area {
                Some(area) => area.clone(),
                None => {
                    warn!(time, "country 태그가 없는 행을 건너뜁니다");
                    continue;
                }
            },
        };

        let timestamp = DateTime::parse_from_rfc3339(time)
            .map_err(|e| DataError::ParseError(format!("잘못된 _time '{}': {}", time, e)))?
            .with_timezone(&Utc);
        let value = Decimal::from_str(value)
            .or_else(|_| Decimal::from_scientific(value))
            .map_err(|e| DataError::ParseError(format!("잘못된 _value '{}': {}", value, e)))?;

        grouped
            .entry(area)
            .or_default()
            .push(RawSample::new(timestamp, value));
    }

    Ok(grouped
        .into_iter()
        .map(|(area, samples)| SampleSeries { area, samples })
        .collect())
}

#[async_trait]
impl PriceStore for InfluxStore {
    fn name(&self) -> &str {
        "InfluxDB"
    }

    #[instrument(skip(self, points), fields(count = points.len()))]
    async fn write_points(&self, points: &[StoredPoint]) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }

        let body = encode_line_protocol(points)?;

        let response = self
            .client
            .post(self.endpoint("/api/v2/write"))
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header("Authorization", self.config.authorization())
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DataError::WriteError(format!("[{}] {}", status, message)));
        }

        debug!(count = points.len(), bucket = %self.config.bucket, "포인트 기록 완료");
        Ok(points.len())
    }

    #[instrument(skip(self))]
    async fn read_series(&self, query: &SeriesQuery) -> Result<Vec<SampleSeries>> {
        let flux = build_flux_query(&self.config.bucket, query);

        let response = self
            .client
            .post(self.endpoint("/api/v2/query"))
            .query(&[("org", self.config.org.as_str())])
            .header("Authorization", self.config.authorization())
            .header("Accept", "application/csv")
            .json(&json!({
                "query": flux,
                "type": "flux",
                "dialect": {
                    "header": true,
                    "annotations": [],
                    "delimiter": ","
                }
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DataError::QueryError(format!("[{}] {}", status, body)));
        }

        let series = parse_flux_csv(&body, query.area.as_ref())?;
        debug!(
            series = series.len(),
            samples = series.iter().map(|s| s.samples.len()).sum::<usize>(),
            "시계열 조회 완료"
        );
        Ok(series)
    }

    async fn ping(&self) -> Result<()> {
        let response = self.client.get(self.endpoint("/ping")).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(DataError::ConnectionError(format!(
                "ping 실패: {}",
                response.status()
            )))
        }
    }
}
