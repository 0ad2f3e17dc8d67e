//! 롤링 윈도우 임포트.

use chrono::{DateTime, TimeDelta, Utc};
use spot_core::{AreaTag, TaxRate, TimeWindow};

use super::ingest::{IngestionPipeline, IngestionRequest};
use crate::{CollectorConfig, CollectorError, Result, RunSummary};

/// 기준 시각 전후의 롤링 임포트 구간
pub fn rolling_window(
    now: DateTime<Utc>,
    lookback_days: i64,
    lookahead_days: i64,
) -> Result<TimeWindow> {
    let days = |name: &str, value: i64| {
        TimeDelta::try_days(value).ok_or_else(|| {
            CollectorError::Config(format!("{} 범위 초과: {}", name, value))
        })
    };
    Ok(TimeWindow::around(
        now,
        days("IMPORT_LOOKBACK_DAYS", lookback_days)?,
        days("IMPORT_LOOKAHEAD_DAYS", lookahead_days)?,
    )?)
}

/// 최근 가격 임포트 (과거 N일 ~ 미래 M일, 청크 하나)
pub async fn import_recent(
    pipeline: &IngestionPipeline,
    config: &CollectorConfig,
    area: &AreaTag,
    tax_rate: TaxRate,
) -> Result<RunSummary> {
    let window = rolling_window(
        Utc::now(),
        config.ingest.lookback_days,
        config.ingest.lookahead_days,
    )?;

    tracing::info!(
        area = %area,
        start = %window.start,
        end = %window.end,
        "롤링 임포트 시작"
    );

    pipeline
        .run(&IngestionRequest::single(
            area.clone(),
            window.start,
            window.end,
            tax_rate,
        ))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rolling_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let window = rolling_window(now, 7, 2).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 12, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_rolling_window_rejects_empty() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert!(rolling_window(now, 0, 0).is_err());
    }

    #[test]
    fn test_rolling_window_rejects_unrepresentable_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert!(matches!(
            rolling_window(now, i64::MAX, 2),
            Err(CollectorError::Config(_))
        ));
        assert!(matches!(
            rolling_window(now, 7, i64::MAX),
            Err(CollectorError::Config(_))
        ));
        assert!(rolling_window(now, 100_000_000, 2).is_err());
    }
}
