//! 청크 분할 / 구간 재구성 속성 테스트
//!
//! 임의의 범위와 샘플 시퀀스에 대해 커버리지와 연속성을 검증한다.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use spot_core::{plan_chunks, reconstruct_intervals, RawSample, DEFAULT_SETTLEMENT_PERIOD};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

proptest! {
    #[test]
    fn chunks_cover_range_exactly(
        offset_minutes in 0i64..100_000,
        span_minutes in 1i64..500_000,
        width_minutes in 1i64..100_000,
    ) {
        let start = base_time() + TimeDelta::minutes(offset_minutes);
        let end = start + TimeDelta::minutes(span_minutes);
        let width = TimeDelta::minutes(width_minutes);

        let plan = plan_chunks(start, end, width).unwrap();
        let planned_len = plan.len();
        let chunks: Vec<_> = plan.collect();

        prop_assert_eq!(chunks.len(), planned_len);
        prop_assert_eq!(chunks.first().unwrap().start, start);
        prop_assert_eq!(chunks.last().unwrap().end, end);
        for chunk in &chunks {
            prop_assert!(chunk.start < chunk.end);
            prop_assert!(chunk.duration() <= width);
        }
        for pair in chunks.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn chunk_count_matches_len_for_sub_millisecond_widths(
        span_micros in 1i64..20_000,
        width_nanos in 1_000i64..3_000_000,
    ) {
        let start = base_time();
        let end = start + TimeDelta::microseconds(span_micros);

        let plan = plan_chunks(start, end, TimeDelta::nanoseconds(width_nanos)).unwrap();
        let planned_len = plan.len();
        let chunks: Vec<_> = plan.collect();

        prop_assert_eq!(chunks.len(), planned_len);
        prop_assert_eq!(chunks.last().unwrap().end, end);
    }

    #[test]
    fn intervals_are_contiguous(
        gaps in proptest::collection::vec(1i64..240, 2..200),
        cents in proptest::collection::vec(-50_000i64..500_000, 200),
    ) {
        let mut ts = base_time();
        let samples: Vec<RawSample> = gaps
            .iter()
            .zip(cents.iter())
            .map(|(gap, value)| {
                ts += TimeDelta::minutes(*gap);
                RawSample::new(ts, Decimal::new(*value, 2))
            })
            .collect();

        let intervals = reconstruct_intervals(&samples, DEFAULT_SETTLEMENT_PERIOD).unwrap();

        prop_assert_eq!(intervals.len(), samples.len());
        for pair in intervals.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        for (interval, sample) in intervals.iter().zip(&samples) {
            prop_assert!(interval.start < interval.end);
            prop_assert_eq!(interval.start, sample.timestamp);
            prop_assert_eq!(interval.value, sample.value);
        }
        let last = intervals.last().unwrap();
        prop_assert_eq!(last.end - last.start, DEFAULT_SETTLEMENT_PERIOD);
    }
}
