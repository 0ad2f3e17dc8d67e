//! ENTSO-E Transparency Platform 클라이언트.
//!
//! 전일 가격(documentType A44)을 조회합니다. 보안 토큰은 쿼리 파라미터로
//! 전달되므로 URL을 그대로 로그에 남기지 않습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use spot_core::{AreaTag, Settings};
//! use spot_data::provider::{EntsoeClient, MarketDataSource};
//!
//! let client = EntsoeClient::new(&Settings::load()?.entsoe()?)?;
//! let area = AreaTag::new("BE")?;
//! let samples = client.fetch_day_ahead(&area, start, end).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spot_core::{AreaTag, EntsoeConfig, RawSample};
use tracing::{debug, warn};

use super::document::{parse_document, MarketDocument};
use super::MarketDataSource;
use crate::error::{DataError, Result};

/// 전일 가격 문서 유형.
const DOCUMENT_TYPE_DAY_AHEAD: &str = "A44";
/// 일간 계약 유형.
const CONTRACT_TYPE_DAILY: &str = "A01";
/// 요청 기간 형식 (UTC).
const PERIOD_FORMAT: &str = "%Y%m%d%H%M";

/// ENTSO-E 전일 가격 클라이언트.
///
/// 내부 `reqwest::Client`는 불변이며 호출 간에 공유됩니다.
#[derive(Clone)]
pub struct EntsoeClient {
    client: reqwest::Client,
    config: EntsoeConfig,
}

impl EntsoeClient {
    /// 새 클라이언트를 생성합니다.
    pub fn new(config: &EntsoeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// 원본 XML 문서를 요청합니다.
    async fn request_document(
        &self,
        eic_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<String> {
        let period_start = start.format(PERIOD_FORMAT).to_string();
        let period_end = end.format(PERIOD_FORMAT).to_string();

        let params = [
            ("securityToken", self.config.api_key()),
            ("documentType", DOCUMENT_TYPE_DAY_AHEAD),
            ("in_Domain", eic_code),
            ("out_Domain", eic_code),
            ("periodStart", period_start.as_str()),
            ("periodEnd", period_end.as_str()),
            ("contract_MarketAgreement.type", CONTRACT_TYPE_DAILY),
        ];

        debug!(
            domain = eic_code,
            period_start = %period_start,
            period_end = %period_end,
            "ENTSO-E 요청"
        );

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DataError::ConnectionError(e.without_url().to_string()))?;

        // 데이터 없음 응답은 4xx 상태와 함께 Acknowledgement 문서로 올 수 있음
        if !status.is_success() && !body.contains("Acknowledgement_MarketDocument") {
            return Err(DataError::FetchError(format!(
                "ENTSO-E 응답 오류 [{}]: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl MarketDataSource for EntsoeClient {
    fn name(&self) -> &str {
        "ENTSO-E"
    }

    async fn fetch_day_ahead(
        &self,
        area: &AreaTag,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawSample>> {
        let eic_code = area.require_eic_code()?;
        let body = self.request_document(eic_code, start, end).await?;

        match parse_document(&body)? {
            MarketDocument::Prices(samples) => {
                let total = samples.len();
                let samples: Vec<RawSample> = samples
                    .into_iter()
                    .filter(|s| start <= s.timestamp && s.timestamp < end)
                    .collect();
                debug!(
                    area = %area,
                    received = total,
                    in_range = samples.len(),
                    "ENTSO-E 가격 수신"
                );
                Ok(samples)
            }
            MarketDocument::NoData(reason) => {
                warn!(area = %area, reason = %reason, "ENTSO-E 데이터 없음");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    const TWO_HOURS: &str = r#"<Publication_MarketDocument>
  <TimeSeries>
    <Period>
      <timeInterval><start>2023-12-31T23:00Z</start><end>2024-01-01T02:00Z</end></timeInterval>
      <resolution>PT60M</resolution>
      <Point><position>1</position><price.amount>70.00</price.amount></Point>
      <Point><position>2</position><price.amount>100.00</price.amount></Point>
      <Point><position>3</position><price.amount>90.00</price.amount></Point>
    </Period>
  </TimeSeries>
</Publication_MarketDocument>"#;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap(),
        )
    }

    fn client_for(server: &mockito::Server) -> EntsoeClient {
        EntsoeClient::new(&EntsoeConfig::new("secret-key", format!("{}/api", server.url()))).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_day_ahead_sends_query_and_truncates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("securityToken".into(), "secret-key".into()),
                Matcher::UrlEncoded("documentType".into(), "A44".into()),
                Matcher::UrlEncoded("in_Domain".into(), "10YBE----------2".into()),
                Matcher::UrlEncoded("out_Domain".into(), "10YBE----------2".into()),
                Matcher::UrlEncoded("periodStart".into(), "202401010000".into()),
                Matcher::UrlEncoded("periodEnd".into(), "202401010200".into()),
                Matcher::UrlEncoded("contract_MarketAgreement.type".into(), "A01".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(TWO_HOURS)
            .create_async()
            .await;

        let client = client_for(&server);
        let (start, end) = window();
        let samples = client
            .fetch_day_ahead(&AreaTag::new("BE").unwrap(), start, end)
            .await
            .unwrap();

        mock.assert_async().await;
        // 23:00 포인트는 요청 범위 밖
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], RawSample::new(start, dec!(100.00)));
        assert_eq!(samples[1].value, dec!(90.00));
    }

    #[tokio::test]
    async fn test_no_data_with_error_status_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(
                r#"<Acknowledgement_MarketDocument>
  <Reason><code>999</code><text>No matching data found</text></Reason>
</Acknowledgement_MarketDocument>"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let (start, end) = window();
        let samples = client
            .fetch_day_ahead(&AreaTag::new("NL").unwrap(), start, end)
            .await
            .unwrap();
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let client = client_for(&server);
        let (start, end) = window();
        let err = client
            .fetch_day_ahead(&AreaTag::new("BE").unwrap(), start, end)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::FetchError(_)));
        assert!(!err.to_string().contains("secret-key"));
    }

    #[tokio::test]
    async fn test_unknown_area_fails_before_request() {
        let server = mockito::Server::new_async().await;
        let client = client_for(&server);
        let (start, end) = window();
        let err = client
            .fetch_day_ahead(&AreaTag::new("ATLANTIS").unwrap(), start, end)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidData(_)));
    }
}
