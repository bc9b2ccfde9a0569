//! Job records, the lifecycle state machine and the registry that holds them.

pub mod model;
pub mod registry;
pub mod state;

pub use model::{Job, JobCounts, JobId, JobResult, JobState, SourceKind};
pub use registry::{url_display_name, JobRegistry, NewJob};
pub use state::{Transition, COMPLETED_PROGRESS, STARTED_PROGRESS};
