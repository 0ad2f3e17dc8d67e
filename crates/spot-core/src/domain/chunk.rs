//! 시간 범위 청크 분할.
//!
//! 장기간 백필은 시장 데이터 소스의 요청 한도 때문에 한 번에 가져올 수
//! 없으므로, 전체 범위를 청크 폭 이하의 연속된 하위 구간으로 나눕니다.
//!
//! 청크는 필요할 때마다 하나씩 생성됩니다 (수백 개의 청크도 미리 만들지 않음).

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SpotError, SpotResult};

/// 하나의 수집 단위 구간 `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Chunk {
    /// 청크 길이.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// 청크 시퀀스 (지연 생성 iterator).
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    width: TimeDelta,
}

/// 전체 범위를 청크 폭 이하의 연속 구간으로 분할합니다.
///
/// `range_start < range_end`이고 `chunk_width > 0`이어야 합니다.
///
/// # 예제
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use spot_core::plan_chunks;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let end = start + TimeDelta::days(90);
/// let chunks: Vec<_> = plan_chunks(start, end, TimeDelta::days(30)).unwrap().collect();
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[2].end, end);
/// ```
pub fn plan_chunks(
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    chunk_width: TimeDelta,
) -> SpotResult<ChunkPlan> {
    if range_start >= range_end {
        return Err(SpotError::InvalidRange {
            start: range_start,
            end: range_end,
            reason: "start는 end보다 앞서야 합니다".to_string(),
        });
    }
    if chunk_width <= TimeDelta::zero() {
        return Err(SpotError::InvalidRange {
            start: range_start,
            end: range_end,
            reason: format!("청크 폭은 양수여야 합니다: {}", chunk_width),
        });
    }

    Ok(ChunkPlan {
        cursor: range_start,
        end: range_end,
        width: chunk_width,
    })
}

impl ChunkPlan {
    /// 남은 청크 수 (나노초 단위 올림 나눗셈).
    fn remaining(&self) -> usize {
        if self.cursor >= self.end {
            return 0;
        }
        let span = total_nanos(self.end - self.cursor);
        let width = total_nanos(self.width);
        usize::try_from((span + width - 1) / width).unwrap_or(usize::MAX)
    }
}

fn total_nanos(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * 1_000_000_000 + i128::from(delta.subsec_nanos())
}

impl Iterator for ChunkPlan {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.cursor >= self.end {
            return None;
        }

        let next_end = self
            .cursor
            .checked_add_signed(self.width)
            .map_or(self.end, |t| t.min(self.end));

        let chunk = Chunk {
            start: self.cursor,
            end: next_end,
        };
        self.cursor = next_end;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for ChunkPlan {}
