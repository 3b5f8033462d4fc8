use proptest::prelude::*;

/// Epoch millis within a few decades of now
pub fn now_strategy() -> impl Strategy<Value = i64> {
    1_000_000_000_000i64..3_000_000_000_000
}

/// Offsets from now to a deadline, both past and future, up to a day
pub fn deadline_offset_strategy() -> impl Strategy<Value = i64> {
    -86_400_000i64..=86_400_000
}

/// Strictly increasing attempt start offsets, at least a second apart
pub fn attempt_starts_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1_000i64..20_000, 1..8).prop_map(|gaps| {
        gaps.iter()
            .scan(0i64, |acc, gap| {
                *acc += gap;
                Some(*acc)
            })
            .collect()
    })
}

pub fn retry_count_strategy() -> impl Strategy<Value = u32> {
    0u32..=10
}
