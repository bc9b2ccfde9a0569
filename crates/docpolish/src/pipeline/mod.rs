pub mod error;
pub mod executor;
pub mod progress;
pub mod prompt;

pub use error::PipelineError;
pub use executor::JobExecutor;
pub use progress::JobTracker;
pub use prompt::build_prompt;
