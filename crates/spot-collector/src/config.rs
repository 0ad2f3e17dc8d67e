//! 환경변수 기반 설정 모듈.

use spot_core::{EntsoeConfig, InfluxConfig, PricingConfig, Settings};
use std::time::Duration;

use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// ENTSO-E API 설정
    pub entsoe: EntsoeConfig,
    /// InfluxDB 설정
    pub influx: InfluxConfig,
    /// 기본 세율 / 지역
    pub pricing: PricingConfig,
    /// 수집 설정
    pub ingest: IngestConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 수집 설정
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// ENTSO-E 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 롤링 임포트 과거 범위 (일)
    pub lookback_days: i64,
    /// 롤링 임포트 미래 범위 (일)
    pub lookahead_days: i64,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 임포트 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1000,
            lookback_days: 7,
            lookahead_days: 2,
        }
    }
}

impl CollectorConfig {
    /// `.env`, `config/default.toml`, 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Settings::load()?;
        Self::from_settings(&settings)
    }

    /// 로드된 원시 설정을 검증합니다. 필수 값이 없으면 에러를 반환합니다.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let defaults = IngestConfig::default();

        Ok(Self {
            entsoe: settings.entsoe()?,
            influx: settings.influx()?,
            pricing: settings.pricing()?,
            ingest: IngestConfig {
                request_delay_ms: env_var_parse(
                    "ENTSOE_REQUEST_DELAY_MS",
                    defaults.request_delay_ms,
                ),
                lookback_days: env_var_parse("IMPORT_LOOKBACK_DAYS", defaults.lookback_days),
                lookahead_days: env_var_parse("IMPORT_LOOKAHEAD_DAYS", defaults.lookahead_days),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 60),
            },
        })
    }
}

impl IngestConfig {
    /// 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DaemonConfig {
    /// 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.max(1) * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_requires_credentials() {
        let err = CollectorConfig::from_settings(&Settings::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_from_settings_defaults() {
        let settings = Settings {
            entsoe_api_key: Some("key".to_string()),
            influx_token: Some("token".to_string()),
            influx_org: Some("org".to_string()),
            ..Default::default()
        };
        let config = CollectorConfig::from_settings(&settings).unwrap();
        assert_eq!(config.pricing.default_area.country_code(), "BE");
        assert_eq!(config.influx.bucket, "energy_prices");
        assert_eq!(config.ingest.lookback_days, 7);
        assert_eq!(config.ingest.lookahead_days, 2);
    }

    #[test]
    fn test_daemon_interval_minimum() {
        let daemon = DaemonConfig { interval_minutes: 0 };
        assert_eq!(daemon.interval(), Duration::from_secs(60));
    }
}
