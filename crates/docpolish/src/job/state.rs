//! Job lifecycle state machine.
//!
//! ```text
//! Uploaded ──start──▶ Processing ──complete──▶ Completed
//!    │                    │
//!    └──────fail──────────┴────────fail──────▶ Failed
//! ```
//!
//! Terminal states accept nothing. A rejected transition leaves the job
//! exactly as it was.

use chrono::Utc;

use super::model::{Job, JobState};
use crate::error::RegistryError;

/// Progress reported once the backend call has been issued.
pub const STARTED_PROGRESS: u8 = 10;

/// Progress of a completed job.
pub const COMPLETED_PROGRESS: u8 = 100;

/// A requested change to a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Uploaded → Processing.
    Start,
    /// Processing → Processing with a higher progress value below 100.
    Progress(u8),
    /// Processing → Completed.
    Complete { improved_text: String },
    /// Uploaded or Processing → Failed.
    Fail { error: String },
}

impl Transition {
    /// State the job would be in after this transition.
    pub fn target(&self) -> JobState {
        match self {
            Transition::Start | Transition::Progress(_) => JobState::Processing,
            Transition::Complete { .. } => JobState::Completed,
            Transition::Fail { .. } => JobState::Failed,
        }
    }

    /// Checks the transition against the job without touching it.
    pub fn check(&self, job: &Job) -> Result<(), RegistryError> {
        let from = job.state;
        let allowed = match (from, self) {
            (JobState::Uploaded, Transition::Start) => true,
            (JobState::Processing, Transition::Progress(n)) => {
                *n >= job.progress && *n < COMPLETED_PROGRESS
            }
            (JobState::Processing, Transition::Complete { .. }) => true,
            (JobState::Uploaded | JobState::Processing, Transition::Fail { .. }) => true,
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(RegistryError::InvalidTransition {
                id: job.id.clone(),
                from,
                to: self.target(),
            })
        }
    }

    /// Applies the transition, or rejects it leaving `job` unchanged.
    pub fn apply(self, job: &mut Job) -> Result<(), RegistryError> {
        self.check(job)?;

        match self {
            Transition::Start => {
                job.state = JobState::Processing;
                job.progress = STARTED_PROGRESS;
            }
            Transition::Progress(n) => {
                job.progress = n;
            }
            Transition::Complete { improved_text } => {
                job.state = JobState::Completed;
                job.progress = COMPLETED_PROGRESS;
                job.improved_text = Some(improved_text);
                job.completed_at = Some(Utc::now());
            }
            Transition::Fail { error } => {
                let error = if error.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    error
                };
                job.state = JobState::Failed;
                job.error_detail = Some(error);
                job.completed_at = Some(Utc::now());
            }
        }

        Ok(())
    }
}
