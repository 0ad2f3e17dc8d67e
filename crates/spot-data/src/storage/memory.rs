//! 프로세스 내 가격 저장소.
//!
//! InfluxDB와 같은 덮어쓰기 규칙을 따르므로 파이프라인/조회 서비스 테스트에
//! 그대로 사용할 수 있습니다. 장애 주입 스위치로 쓰기 실패나 저장소 다운을
//! 흉내낼 수 있습니다.

use async_trait::async_trait;
use spot_core::{AreaTag, PointKey, RawSample, SampleSeries, StoredPoint};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{PriceStore, SeriesQuery};
use crate::error::{DataError, Result};

/// 메모리 기반 가격 저장소.
#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    points: RwLock<BTreeMap<PointKey, StoredPoint>>,
    write_calls: AtomicUsize,
    unavailable: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장소 전체를 사용 불가 상태로 전환합니다 (조회/쓰기/ping 모두 실패).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 쓰기만 실패하도록 전환합니다.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// `write_points` 호출 횟수 (빈 호출 포함).
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// 저장된 포인트 수.
    pub async fn len(&self) -> usize {
        self.points.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }

    /// 저장된 포인트를 키 순서로 반환합니다.
    pub async fn points(&self) -> Vec<StoredPoint> {
        self.points.read().await.values().cloned().collect()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DataError::ConnectionError(
                "memory store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn write_points(&self, points: &[StoredPoint]) -> Result<usize> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DataError::WriteError("write rejected".to_string()));
        }

        let mut stored = self.points.write().await;
        for point in points {
            stored.insert(point.key(), point.clone());
        }
        Ok(points.len())
    }

    async fn read_series(&self, query: &SeriesQuery) -> Result<Vec<SampleSeries>> {
        self.check_available()?;

        // 키 순서가 (area, price_type, timestamp)이므로 지역별 오름차순이 유지됨
        let stored = self.points.read().await;
        let mut grouped: BTreeMap<AreaTag, Vec<RawSample>> = BTreeMap::new();
        for point in stored.values().filter(|p| {
            p.price_type == query.price_type
                && query.window.contains(p.timestamp)
                && query.area.as_ref().map_or(true, |area| &p.area == area)
        }) {
            grouped
                .entry(point.area.clone())
                .or_default()
                .push(point.to_sample());
        }

        Ok(grouped
            .into_iter()
            .map(|(area, samples)| SampleSeries { area, samples })
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}
