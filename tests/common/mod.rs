#![allow(dead_code)] // Each test binary uses a different subset

pub mod strategies;

use loadtask_core::registry::QueryRegistry;
use loadtask_core::task::{LoadTask, LoadTaskServices};
use loadtask_core::test_helpers::{
    sample_file_statuses, sample_params, ManualClock, MockBehavior, MockCoordinatorFactory,
};
use loadtask_core::types::LoadId;
use std::sync::Arc;

pub const NOW: i64 = 1_700_000_000_000;

/// Isolated registry, scripted coordinators and a pinned clock for one test
pub struct LoadHarness {
    pub factory: Arc<MockCoordinatorFactory>,
    pub registry: Arc<QueryRegistry>,
    pub clock: Arc<ManualClock>,
}

impl LoadHarness {
    pub fn new(behavior: MockBehavior) -> Self {
        Self::from_factory(MockCoordinatorFactory::new(behavior))
    }

    pub fn with_sequence(behaviors: Vec<MockBehavior>) -> Self {
        Self::from_factory(MockCoordinatorFactory::with_sequence(behaviors))
    }

    fn from_factory(factory: MockCoordinatorFactory) -> Self {
        let registry = Arc::new(QueryRegistry::new());
        Self {
            factory: Arc::new(factory.with_registry(Arc::clone(&registry))),
            registry,
            clock: Arc::new(ManualClock::new(NOW)),
        }
    }

    pub fn services(&self) -> LoadTaskServices {
        LoadTaskServices::new(self.factory.clone(), Arc::clone(&self.registry))
            .with_clock(self.clock.clone())
    }

    /// A planned task whose deadline is `deadline_in_ms` after NOW
    pub fn planned_task(&self, deadline_in_ms: i64) -> LoadTask {
        let mut task = LoadTask::new(sample_params(NOW + deadline_in_ms), self.services());
        let (statuses, count) = sample_file_statuses();
        task.init(LoadId::generate(), &statuses, count)
            .expect("sample load should plan");
        task
    }
}
