//! 과거 데이터 백필.

use chrono::{DateTime, TimeDelta, Utc};
use spot_core::{AreaTag, TaxRate};

use super::ingest::{IngestionPipeline, IngestionRequest};
use crate::{CollectorError, Result, RunSummary};

/// 백필 옵션
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillOptions {
    /// 과거 범위 (일)
    pub days: i64,
    /// 청크 폭 (일)
    pub chunk_days: i64,
    /// 드라이런
    pub dry_run: bool,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self {
            days: 365,
            chunk_days: 30,
            dry_run: false,
        }
    }
}

impl BackfillOptions {
    /// 기준 시각까지의 백필 요청을 생성합니다.
    pub fn to_request(
        &self,
        area: AreaTag,
        tax_rate: TaxRate,
        now: DateTime<Utc>,
    ) -> Result<IngestionRequest> {
        if self.days <= 0 || self.chunk_days <= 0 {
            return Err(CollectorError::Config(format!(
                "days와 chunk_days는 양수여야 합니다 (days={}, chunk_days={})",
                self.days, self.chunk_days
            )));
        }

        let out_of_range = |name: &str, value: i64| {
            CollectorError::Config(format!(
                "{}이(가) 표현 가능한 범위를 벗어났습니다: {}",
                name, value
            ))
        };
        let start = TimeDelta::try_days(self.days)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| out_of_range("days", self.days))?;
        let chunk_width = TimeDelta::try_days(self.chunk_days)
            .ok_or_else(|| out_of_range("chunk_days", self.chunk_days))?;

        Ok(IngestionRequest {
            area,
            start,
            end: now,
            tax_rate,
            chunk_width,
            dry_run: self.dry_run,
        })
    }
}

/// 과거 N일을 청크 단위로 백필합니다.
pub async fn backfill(
    pipeline: &IngestionPipeline,
    area: &AreaTag,
    tax_rate: TaxRate,
    options: BackfillOptions,
) -> Result<RunSummary> {
    let request = options.to_request(area.clone(), tax_rate, Utc::now())?;

    tracing::info!(
        area = %area,
        days = options.days,
        chunk_days = options.chunk_days,
        dry_run = options.dry_run,
        "백필 시작"
    );

    pipeline.run(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_request() {
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let options = BackfillOptions {
            days: 90,
            chunk_days: 30,
            dry_run: true,
        };
        let request = options
            .to_request(AreaTag::new("BE").unwrap(), TaxRate::ZERO, now)
            .unwrap();

        assert_eq!(request.end, now);
        assert_eq!(request.end - request.start, TimeDelta::days(90));
        assert_eq!(request.chunk_width, TimeDelta::days(30));
        assert!(request.dry_run);
    }

    #[test]
    fn test_to_request_rejects_non_positive() {
        let now = Utc::now();
        let area = AreaTag::new("BE").unwrap();
        for (days, chunk_days) in [(0, 30), (30, 0), (-1, 1)] {
            let options = BackfillOptions {
                days,
                chunk_days,
                dry_run: false,
            };
            assert!(options.to_request(area.clone(), TaxRate::ZERO, now).is_err());
        }
    }

    #[test]
    fn test_to_request_rejects_unrepresentable_range() {
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let area = AreaTag::new("BE").unwrap();
        for (days, chunk_days) in [(i64::MAX, 30), (100_000_000, 30), (90, i64::MAX)] {
            let options = BackfillOptions {
                days,
                chunk_days,
                dry_run: true,
            };
            assert!(matches!(
                options.to_request(area.clone(), TaxRate::ZERO, now),
                Err(CollectorError::Config(_))
            ));
        }
    }
}
