//! 설정 관리.
//!
//! 설정은 다음 순서로 병합됩니다 (뒤쪽이 우선):
//! 1. `config/default.toml` (선택)
//! 2. 환경 변수 (`ENTSOE_API_KEY`, `INFLUX_URL`, `INFLUX_TOKEN`, `INFLUX_ORG`,
//!    `INFLUX_BUCKET`, `TAX`, `COUNTRY_CODE`, `HTTP_TIMEOUT_SECS`,
//!    `INGEST_DIVISOR`, `QUERY_DIVISOR`)
//!
//! 원시 값은 [`Settings`]로 로드된 뒤 용도별 설정으로 검증됩니다. 필수 값이
//! 없으면 [`SpotError::Config`]를 반환하며, 바이너리는 시작 시점에 종료합니다.

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::AreaTag;
use crate::error::{SpotError, SpotResult};
use crate::types::{TaxRate, UnitTaxTransform, INGEST_DIVISOR, QUERY_DIVISOR};

/// 기본 InfluxDB URL.
pub const DEFAULT_INFLUX_URL: &str = "http://localhost:8086";
/// 기본 InfluxDB 버킷.
pub const DEFAULT_INFLUX_BUCKET: &str = "energy_prices";
/// 기본 ENTSO-E API URL.
pub const DEFAULT_ENTSOE_URL: &str = "https://web-api.tp.entsoe.eu/api";
/// 기본 지역 코드.
pub const DEFAULT_COUNTRY_CODE: &str = "BE";
/// 기본 HTTP 타임아웃 (초).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// 원시 설정 값 (파일 + 환경 변수).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub entsoe_api_key: Option<String>,
    #[serde(default)]
    pub entsoe_url: Option<String>,
    #[serde(default)]
    pub influx_url: Option<String>,
    #[serde(default)]
    pub influx_token: Option<String>,
    #[serde(default)]
    pub influx_org: Option<String>,
    #[serde(default)]
    pub influx_bucket: Option<String>,
    #[serde(default)]
    pub tax: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub http_timeout_secs: Option<String>,
    #[serde(default)]
    pub ingest_divisor: Option<String>,
    #[serde(default)]
    pub query_divisor: Option<String>,
}

/// ENTSO-E API 설정.
#[derive(Clone)]
pub struct EntsoeConfig {
    /// API 보안 토큰
    pub api_key: SecretString,
    /// API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃
    pub timeout: Duration,
}

/// InfluxDB 설정.
#[derive(Clone)]
pub struct InfluxConfig {
    /// 서버 URL
    pub url: String,
    /// 인증 토큰
    pub token: SecretString,
    /// 조직
    pub org: String,
    /// 버킷
    pub bucket: String,
    /// 요청 타임아웃
    pub timeout: Duration,
}

/// 가격 기본값 설정.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// 기본 세율
    pub default_tax: TaxRate,
    /// 기본 지역
    pub default_area: AreaTag,
    /// 수집/조회 경로 단위 변환
    pub transform: UnitTaxTransform,
}

impl Settings {
    /// 기본 경로(`config/default.toml`)와 환경 변수에서 설정을 로드합니다.
    pub fn load() -> SpotResult<Self> {
        Self::load_from("config/default.toml")
    }

    /// 지정된 파일(없어도 됨)과 환경 변수에서 설정을 로드합니다.
    pub fn load_from<P: AsRef<Path>>(path: P) -> SpotResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::default().ignore_empty(true));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// ENTSO-E 설정을 검증합니다. API 키는 필수입니다.
    pub fn entsoe(&self) -> SpotResult<EntsoeConfig> {
        let api_key = require(&self.entsoe_api_key, "ENTSOE_API_KEY")?;
        Ok(EntsoeConfig {
            api_key: SecretString::from(api_key),
            base_url: self
                .entsoe_url
                .clone()
                .unwrap_or_else(|| DEFAULT_ENTSOE_URL.to_string()),
            timeout: self.http_timeout()?,
        })
    }

    /// InfluxDB 설정을 검증합니다. 토큰과 조직은 필수입니다.
    pub fn influx(&self) -> SpotResult<InfluxConfig> {
        let token = require(&self.influx_token, "INFLUX_TOKEN")?;
        let org = require(&self.influx_org, "INFLUX_ORG")?;
        Ok(InfluxConfig {
            url: self
                .influx_url
                .clone()
                .unwrap_or_else(|| DEFAULT_INFLUX_URL.to_string()),
            token: SecretString::from(token),
            org,
            bucket: self
                .influx_bucket
                .clone()
                .unwrap_or_else(|| DEFAULT_INFLUX_BUCKET.to_string()),
            timeout: self.http_timeout()?,
        })
    }

    /// 가격 기본값을 검증합니다.
    pub fn pricing(&self) -> SpotResult<PricingConfig> {
        let default_tax = match self.tax.as_deref() {
            Some(raw) => raw.parse::<TaxRate>()?,
            None => TaxRate::ZERO,
        };
        let default_area = AreaTag::new(
            self.country_code
                .as_deref()
                .unwrap_or(DEFAULT_COUNTRY_CODE),
        )
        .map_err(|e| SpotError::Config(e.to_string()))?;

        let transform = UnitTaxTransform::with_divisors(
            parse_divisor(self.ingest_divisor.as_deref(), "INGEST_DIVISOR", INGEST_DIVISOR)?,
            parse_divisor(self.query_divisor.as_deref(), "QUERY_DIVISOR", QUERY_DIVISOR)?,
        )?;

        Ok(PricingConfig {
            default_tax,
            default_area,
            transform,
        })
    }

    fn http_timeout(&self) -> SpotResult<Duration> {
        match self.http_timeout_secs.as_deref() {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| {
                    SpotError::Config(format!("HTTP_TIMEOUT_SECS 파싱 실패 '{}': {}", raw, e))
                }),
            None => Ok(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
        }
    }
}

impl EntsoeConfig {
    /// 기본 타임아웃으로 설정을 생성합니다.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// API 키 원문.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl InfluxConfig {
    /// 기본 타임아웃으로 설정을 생성합니다.
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        org: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            token: SecretString::from(token.into()),
            org: org.into(),
            bucket: bucket.into(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// `Authorization` 헤더 값.
    pub fn authorization(&self) -> String {
        format!("Token {}", self.token.expose_secret())
    }
}

impl fmt::Debug for EntsoeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntsoeConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_divisor(raw: Option<&str>, env_name: &str, default: Decimal) -> SpotResult<Decimal> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Decimal::from_str(value)
            .map_err(|e| SpotError::Config(format!("{} 파싱 실패 '{}': {}", env_name, value, e))),
        None => Ok(default),
    }
}

/// 필수 값을 꺼냅니다. 비어 있으면 설정 에러를 반환합니다.
fn require(value: &Option<String>, env_name: &str) -> SpotResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SpotError::Config(format!("{} 환경변수가 설정되지 않았습니다", env_name)))
}
