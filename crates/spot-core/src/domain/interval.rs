//! 가격 구간 재구성.
//!
//! 저장된 샘플에는 지속 시간이 없으므로, 각 샘플의 종료 시각을 다음
//! 샘플의 시작 시각에서 유도합니다. 마지막 샘플은 기본 정산 구간 길이를
//! 사용합니다.
//!
//! 인접한 샘플이 연속된 실제 정산 구간이라고 가정합니다. 저장소에 공백이
//! 있으면 해당 구간이 비정상적으로 길어지며, 이를 감지하거나 채우지
//! 않습니다.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::RawSample;
use crate::error::{SpotError, SpotResult};

/// 기본 정산 구간 길이 (15분).
pub const DEFAULT_SETTLEMENT_PERIOD: TimeDelta = TimeDelta::minutes(15);

/// 소비자에게 제공되는 가격 구간 `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub value: Decimal,
}

impl PriceInterval {
    /// 구간 길이.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// 값을 변환한 새 구간을 반환합니다.
    pub fn map_value(self, f: impl FnOnce(Decimal) -> Decimal) -> Self {
        Self {
            value: f(self.value),
            ..self
        }
    }
}

/// 오름차순 샘플 시퀀스에서 연속 구간을 재구성합니다.
///
/// 입력은 시각 기준 엄격한 오름차순이어야 하며, 그렇지 않으면
/// [`SpotError::UnsortedInput`]을 반환합니다 (내부에서 정렬하지 않음).
/// 빈 입력은 빈 결과를 반환합니다. `default_duration`은 양수여야 합니다.
pub fn reconstruct_intervals(
    samples: &[RawSample],
    default_duration: TimeDelta,
) -> SpotResult<Vec<PriceInterval>> {
    let anchor = samples.last().map(|s| s.timestamp).unwrap_or_default();
    if default_duration <= TimeDelta::zero() {
        return Err(SpotError::InvalidRange {
            start: anchor,
            end: anchor,
            reason: format!("마지막 구간 길이는 양수여야 합니다: {}", default_duration),
        });
    }

    if let Some(index) = samples
        .windows(2)
        .position(|pair| pair[0].timestamp >= pair[1].timestamp)
    {
        return Err(SpotError::UnsortedInput {
            index: index + 1,
            previous: samples[index].timestamp,
            timestamp: samples[index + 1].timestamp,
        });
    }

    let last_end = match samples.last() {
        Some(last) => Some(
            last.timestamp
                .checked_add_signed(default_duration)
                .ok_or_else(|| SpotError::InvalidRange {
                    start: last.timestamp,
                    end: last.timestamp,
                    reason: format!("마지막 구간 종료 시각 범위 초과: {}", default_duration),
                })?,
        ),
        None => None,
    };
    let ends = samples
        .iter()
        .skip(1)
        .map(|next| next.timestamp)
        .chain(last_end);

    Ok(samples
        .iter()
        .zip(ends)
        .map(|(sample, end)| PriceInterval {
            start: sample.timestamp,
            end,
            value: sample.value,
        })
        .collect())
}
