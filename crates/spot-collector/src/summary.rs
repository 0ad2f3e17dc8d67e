//! 수집 실행 결과 구조체.

use serde::Serialize;
use spot_core::Chunk;
use std::time::Duration;

/// 청크 하나의 처리 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ChunkOutcome {
    /// 기록된 포인트 수
    Success(usize),
    /// 조회 성공, 데이터 없음
    Empty,
    /// 조회 또는 기록 실패 (사유)
    Failed(String),
    /// 드라이런: 계획만 하고 조회하지 않음
    Planned,
}

/// 청크와 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkResult {
    pub chunk: Chunk,
    pub outcome: ChunkOutcome,
}

impl ChunkResult {
    pub fn new(chunk: Chunk, outcome: ChunkOutcome) -> Self {
        Self { chunk, outcome }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Failed(_))
    }
}

/// 수집 실행 요약
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// 계획된 청크 수
    pub total_chunks: usize,
    /// 기록된 총 포인트 수
    pub points_written: usize,
    /// 데이터 없는 청크 수
    pub empty_chunks: usize,
    /// 실패한 청크 범위 (처리 순서)
    pub failed_chunks: Vec<Chunk>,
    /// 청크별 결과 (처리 순서)
    pub results: Vec<ChunkResult>,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunSummary {
    /// 새 요약 객체 생성
    pub fn new(total_chunks: usize) -> Self {
        Self {
            total_chunks,
            results: Vec::with_capacity(total_chunks),
            ..Default::default()
        }
    }

    /// 청크 결과를 누적합니다.
    pub fn record(&mut self, result: ChunkResult) {
        match &result.outcome {
            ChunkOutcome::Success(points) => self.points_written += points,
            ChunkOutcome::Empty => self.empty_chunks += 1,
            ChunkOutcome::Failed(_) => self.failed_chunks.push(result.chunk),
            ChunkOutcome::Planned => {}
        }
        self.results.push(result);
    }

    /// 성공한 청크 수
    pub fn succeeded_chunks(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ChunkOutcome::Success(_)))
            .count()
    }

    /// 드라이런으로 계획만 된 청크 수
    pub fn planned_chunks(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == ChunkOutcome::Planned)
            .count()
    }

    /// 실패한 청크가 있는지 확인
    pub fn has_failures(&self) -> bool {
        !self.failed_chunks.is_empty()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total_chunks == 0 {
            0.0
        } else {
            (self.succeeded_chunks() as f64 / self.total_chunks as f64) * 100.0
        }
    }

    /// 요약 로그 출력. 실패한 청크는 범위를 하나씩 남깁니다.
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total_chunks = self.total_chunks,
            succeeded = self.succeeded_chunks(),
            empty = self.empty_chunks,
            failed = self.failed_chunks.len(),
            planned = self.planned_chunks(),
            points_written = self.points_written,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );

        if !self.has_failures() {
            return;
        }
        for result in self.results.iter().filter(|r| r.is_failed()) {
            if let ChunkOutcome::Failed(reason) = &result.outcome {
                tracing::warn!(
                    operation = operation,
                    chunk = %result.chunk,
                    reason = %reason,
                    "실패한 청크 (재실행 필요)"
                );
            }
        }
    }
}
