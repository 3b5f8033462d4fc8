// Test Helpers Module - Load Task Testing Infrastructure
//
// Provides scripted collaborators and sample load descriptions shared by the
// unit tests and the integration tests under tests/.

pub mod fixtures;
pub mod mock_coordinator;
pub mod recording;

pub use fixtures::{
    sample_database, sample_file_groups, sample_file_statuses, sample_params, sample_table,
    ManualClock, SAMPLE_CALLBACK_ID, SAMPLE_TXN_ID,
};

pub use mock_coordinator::{CoordinatorRecord, MockBehavior, MockCoordinatorFactory, MockOutcome};

pub use recording::{CallbackEvent, RecordingCallback, StaticPlanner};
