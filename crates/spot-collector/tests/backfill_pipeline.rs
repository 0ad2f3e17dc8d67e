//! 백필 파이프라인 통합 테스트 (메모리 저장소 사용).

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rust_decimal_macros::dec;
use spot_collector::modules::{IngestionPipeline, IngestionRequest};
use spot_collector::ChunkOutcome;
use spot_core::{AreaTag, Chunk, RawSample, TaxRate, TimeWindow};
use spot_data::{DataError, MarketDataSource, MemoryPriceStore, PriceStore, SeriesQuery};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 청크마다 하루 한 개 샘플을 돌려주고, 지정된 순번의 호출은 실패하는 소스
struct FlakySource {
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl FlakySource {
    fn new(fail_on_call: Option<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on_call,
        }
    }
}

#[async_trait]
impl MarketDataSource for FlakySource {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn fetch_day_ahead(
        &self,
        _area: &AreaTag,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> spot_data::Result<Vec<RawSample>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if Some(call) == self.fail_on_call {
            return Err(DataError::FetchError("gateway timeout".into()));
        }

        let mut samples = Vec::new();
        let mut ts = start;
        while ts < end {
            samples.push(RawSample::new(ts, dec!(100)));
            ts += TimeDelta::days(1);
        }
        Ok(samples)
    }
}

fn range_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn backfill_request(tax: TaxRate) -> IngestionRequest {
    IngestionRequest {
        area: AreaTag::new("BE").unwrap(),
        start: range_start(),
        end: range_start() + TimeDelta::days(90),
        tax_rate: tax,
        chunk_width: TimeDelta::days(30),
        dry_run: false,
    }
}

async fn stored_timestamps(store: &MemoryPriceStore) -> Vec<DateTime<Utc>> {
    store.points().await.iter().map(|p| p.timestamp).collect()
}

#[tokio::test]
async fn second_chunk_failure_does_not_stop_run() {
    let store = Arc::new(MemoryPriceStore::new());
    let pipeline = IngestionPipeline::new(Arc::new(FlakySource::new(Some(2))), store.clone());

    let summary = pipeline.run(&backfill_request(TaxRate::ZERO)).await.unwrap();

    assert_eq!(summary.total_chunks, 3);
    assert_eq!(summary.results.len(), 3);
    assert_eq!(
        summary.failed_chunks,
        vec![Chunk {
            start: range_start() + TimeDelta::days(30),
            end: range_start() + TimeDelta::days(60),
        }]
    );
    assert_eq!(summary.results[0].outcome, ChunkOutcome::Success(30));
    assert!(summary.results[1].is_failed());
    assert_eq!(summary.results[2].outcome, ChunkOutcome::Success(30));
    assert_eq!(summary.points_written, 60);

    let stored = stored_timestamps(&store).await;
    assert_eq!(stored.len(), 60);
    assert!(stored.contains(&range_start()));
    assert!(stored.contains(&(range_start() + TimeDelta::days(89))));
    assert!(!stored.contains(&(range_start() + TimeDelta::days(45))));
}

#[tokio::test]
async fn rerun_with_different_tax_keeps_one_point_per_key() {
    let store = Arc::new(MemoryPriceStore::new());
    let pipeline = IngestionPipeline::new(Arc::new(FlakySource::new(None)), store.clone());

    pipeline.run(&backfill_request(TaxRate::ZERO)).await.unwrap();
    let tax = TaxRate::new(dec!(0.21)).unwrap();
    pipeline.run(&backfill_request(tax)).await.unwrap();

    assert_eq!(store.len().await, 90);
    assert!(store
        .points()
        .await
        .iter()
        .all(|p| p.price_eur_mwh == dec!(100) && p.price_eur_kwh == dec!(0.1)));

    let window = TimeWindow::new(range_start(), range_start() + TimeDelta::days(90)).unwrap();
    let series = store
        .read_series(&SeriesQuery::day_ahead(None, window))
        .await
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].samples.len(), 90);
}

#[tokio::test]
async fn rerun_recovers_previously_failed_chunk() {
    let store = Arc::new(MemoryPriceStore::new());
    let first = IngestionPipeline::new(Arc::new(FlakySource::new(Some(2))), store.clone());
    let summary = first.run(&backfill_request(TaxRate::ZERO)).await.unwrap();
    let failed = summary.failed_chunks[0];

    let retry = IngestionPipeline::new(Arc::new(FlakySource::new(None)), store.clone());
    let request = IngestionRequest {
        start: failed.start,
        end: failed.end,
        ..backfill_request(TaxRate::ZERO)
    };
    let summary = retry.run(&request).await.unwrap();

    assert_eq!(summary.total_chunks, 1);
    assert!(!summary.has_failures());
    assert_eq!(store.len().await, 90);
}
