//! 청크 단위 수집 파이프라인.
//!
//! 전체 범위를 청크로 나눈 뒤 순서대로 조회 → 변환 → 기록합니다.
//! 청크 하나의 실패는 결과에 기록만 하고 다음 청크로 넘어갑니다.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use spot_core::{plan_chunks, AreaTag, Chunk, StoredPoint, TaxRate, UnitTaxTransform};
use spot_data::{MarketDataSource, PriceStore};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::summary::{ChunkOutcome, ChunkResult, RunSummary};
use crate::Result;

/// 수집 요청
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    /// 대상 지역
    pub area: AreaTag,
    /// 수집 시작 (포함)
    pub start: DateTime<Utc>,
    /// 수집 종료 (제외)
    pub end: DateTime<Utc>,
    /// 세율
    pub tax_rate: TaxRate,
    /// 청크 폭
    pub chunk_width: TimeDelta,
    /// 드라이런 (조회/기록 없이 계획만)
    pub dry_run: bool,
}

impl IngestionRequest {
    /// 전체 범위를 청크 하나로 처리하는 요청
    pub fn single(area: AreaTag, start: DateTime<Utc>, end: DateTime<Utc>, tax_rate: TaxRate) -> Self {
        Self {
            area,
            start,
            end,
            tax_rate,
            chunk_width: end - start,
            dry_run: false,
        }
    }
}

/// 수집 파이프라인
///
/// 소스와 저장소는 공유 핸들로 주입되며, 파이프라인 자체는 상태를 갖지 않습니다.
#[derive(Clone)]
pub struct IngestionPipeline {
    source: Arc<dyn MarketDataSource>,
    store: Arc<dyn PriceStore>,
    transform: UnitTaxTransform,
    request_delay: Duration,
}

impl IngestionPipeline {
    pub fn new(source: Arc<dyn MarketDataSource>, store: Arc<dyn PriceStore>) -> Self {
        Self {
            source,
            store,
            transform: UnitTaxTransform::new(),
            request_delay: Duration::ZERO,
        }
    }

    /// 소스 요청 간 딜레이 설정 (rate limiting)
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// 단위 변환 설정
    pub fn with_transform(mut self, transform: UnitTaxTransform) -> Self {
        self.transform = transform;
        self
    }

    /// 수집을 실행합니다.
    ///
    /// 실행 전체가 실패하는 경우는 범위가 잘못된 경우뿐이며, 청크 실패는
    /// `RunSummary`에 기록됩니다.
    pub async fn run(&self, request: &IngestionRequest) -> Result<RunSummary> {
        let started = Instant::now();
        let plan = plan_chunks(request.start, request.end, request.chunk_width)?;
        let total = plan.len();
        let mut summary = RunSummary::new(total);

        tracing::info!(
            source = self.source.name(),
            store = self.store.name(),
            area = %request.area,
            start = %request.start,
            end = %request.end,
            chunks = total,
            tax = %request.tax_rate,
            dry_run = request.dry_run,
            "수집 시작"
        );

        for (idx, chunk) in plan.enumerate() {
            if request.dry_run {
                tracing::info!(
                    chunk = %chunk,
                    progress = format!("{}/{}", idx + 1, total),
                    "[dry-run] 청크 계획"
                );
                summary.record(ChunkResult::new(chunk, ChunkOutcome::Planned));
                continue;
            }

            // Rate limiting
            if idx > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let outcome = self.process_chunk(request, chunk).await;
            match &outcome {
                ChunkOutcome::Success(points) => tracing::info!(
                    chunk = %chunk,
                    progress = format!("{}/{}", idx + 1, total),
                    points = points,
                    "청크 저장 완료"
                ),
                ChunkOutcome::Empty => tracing::warn!(
                    chunk = %chunk,
                    progress = format!("{}/{}", idx + 1, total),
                    "데이터 없음"
                ),
                ChunkOutcome::Failed(reason) => tracing::error!(
                    chunk = %chunk,
                    progress = format!("{}/{}", idx + 1, total),
                    error = %reason,
                    "청크 실패"
                ),
                ChunkOutcome::Planned => {}
            }
            summary.record(ChunkResult::new(chunk, outcome));
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    async fn process_chunk(&self, request: &IngestionRequest, chunk: Chunk) -> ChunkOutcome {
        let samples = match self
            .source
            .fetch_day_ahead(&request.area, chunk.start, chunk.end)
            .await
        {
            Ok(samples) => samples,
            Err(e) => return ChunkOutcome::Failed(format!("fetch: {}", e)),
        };

        if samples.is_empty() {
            return ChunkOutcome::Empty;
        }

        let points: Vec<StoredPoint> = samples
            .iter()
            .map(|sample| StoredPoint::day_ahead(&request.area, sample, &self.transform))
            .collect();

        // 세금 포함 값은 저장하지 않고 로그로만 남김
        let taxed_total: Decimal = samples
            .iter()
            .map(|s| self.transform.convert(s.value, request.tax_rate).taxed)
            .sum();
        tracing::debug!(
            chunk = %chunk,
            samples = samples.len(),
            avg_taxed_eur_kwh = %(taxed_total / Decimal::from(samples.len())),
            "청크 변환 완료"
        );

        match self.store.write_points(&points).await {
            Ok(written) => ChunkOutcome::Success(written),
            Err(e) => ChunkOutcome::Failed(format!("write: {}", e)),
        }
    }
}
