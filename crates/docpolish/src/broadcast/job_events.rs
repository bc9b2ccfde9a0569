//! Job event broadcaster for real-time status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::job::{Job, JobId, JobState};

/// Default number of events a slow subscriber may fall behind by.
pub const DEFAULT_CAPACITY: usize = 100;

/// A job state change, as pushed to live observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    /// Job identifier.
    #[serde(rename = "document_id")]
    pub job_id: JobId,
    /// Display name of the document.
    pub filename: String,
    /// State after the change.
    pub status: JobState,
    /// Progress after the change.
    pub progress: u8,
    /// Improved document (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improved_text: Option<String>,
    /// Failure cause (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Timestamp of this event.
    pub timestamp: DateTime<Utc>,
}

impl JobEvent {
    /// Builds the event describing a job snapshot.
    pub fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id().clone(),
            filename: job.display_name().to_string(),
            status: job.state(),
            progress: job.progress(),
            improved_text: job.improved_text().map(str::to_string),
            error: job.error_detail().map(str::to_string),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcasts job events to every subscriber.
///
/// Delivery is at-most-once with no replay: a subscriber that falls more than
/// the channel capacity behind loses the oldest events, and one that
/// subscribes late never sees earlier ones.
#[derive(Clone)]
pub struct JobEventBroadcaster {
    sender: Arc<broadcast::Sender<JobEvent>>,
}

impl JobEventBroadcaster {
    /// Creates a new broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers.
    pub fn send(&self, event: JobEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    /// Publishes the current snapshot of a job.
    pub fn publish(&self, job: &Job) {
        self.send(JobEvent::from_job(job));
    }

    /// Creates a new subscriber for job events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for JobEventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
