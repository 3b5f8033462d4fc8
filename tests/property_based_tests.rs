mod common;

use common::strategies::*;
use loadtask_core::deadline::DeadlineTracker;
use loadtask_core::registry::QueryRegistry;
use loadtask_core::task::{LoadTask, LoadTaskServices, RetryState};
use loadtask_core::test_helpers::{
    sample_file_statuses, sample_params, MockBehavior, MockCoordinatorFactory,
};
use loadtask_core::types::LoadId;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

proptest! {
    /// Property: remaining whole seconds is the floor of the remaining millis
    #[test]
    fn remaining_seconds_is_floor_of_millis(now in now_strategy(), offset in deadline_offset_strategy()) {
        let tracker = DeadlineTracker::new(now + offset);
        prop_assert_eq!(tracker.remaining_ms_at(now), offset);
        prop_assert_eq!(tracker.remaining_seconds_at(now), offset.div_euclid(1000));
    }

    /// Property: an attempt budget exists exactly when at least one whole second is left
    #[test]
    fn attempt_budget_requires_a_whole_second(now in now_strategy(), offset in deadline_offset_strategy()) {
        let tracker = DeadlineTracker::new(now + offset);
        match tracker.attempt_budget_at(now) {
            Some(budget) => {
                prop_assert!(offset >= 1000);
                prop_assert_eq!(budget.timeout_seconds as i64, offset / 1000);
            }
            None => prop_assert!(offset < 1000),
        }
    }

    /// Property: later attempts always see strictly fewer remaining seconds
    #[test]
    fn remaining_seconds_strictly_decrease(now in now_strategy(), starts in attempt_starts_strategy()) {
        let deadline = now + 200_000;
        let tracker = DeadlineTracker::new(deadline);
        let seconds: Vec<i64> = starts
            .iter()
            .map(|offset| tracker.remaining_seconds_at(now + offset))
            .collect();
        for pair in seconds.windows(2) {
            prop_assert!(pair[1] < pair[0], "{:?}", seconds);
        }
    }

    /// Property: each attempt consumes exactly one unit, never going below zero
    #[test]
    fn attempts_consume_budget_one_at_a_time(retry_count in retry_count_strategy(), attempts in 0u32..15) {
        let mut state = RetryState::new(retry_count).bind(LoadId::new(1, 1));
        for _ in 0..attempts {
            state = state.attempt();
        }
        prop_assert_eq!(state.retries_left(), retry_count.saturating_sub(attempts));
        prop_assert_eq!(state.attempts(), attempts);
    }

    /// Property: every reset binds an id never used before by the task
    #[test]
    fn retry_reset_never_reuses_load_ids(retry_count in 1u32..=10) {
        let factory = Arc::new(MockCoordinatorFactory::new(MockBehavior::succeed()));
        let services = LoadTaskServices::new(factory, Arc::new(QueryRegistry::new()));
        let params = sample_params(i64::MAX).with_retry_count(retry_count);
        let mut task = LoadTask::new(params, services);
        let (statuses, count) = sample_file_statuses();
        task.init(LoadId::generate(), &statuses, count).unwrap();

        for _ in 0..retry_count {
            task.retry_reset().unwrap();
        }

        let used = task.used_load_ids();
        prop_assert_eq!(used.len(), retry_count as usize + 1);
        let unique: HashSet<_> = used.iter().copied().collect();
        prop_assert_eq!(unique.len(), used.len());
        prop_assert_eq!(task.plan().unwrap().load_id(), *used.last().unwrap());
    }
}
