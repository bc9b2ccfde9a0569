use std::sync::Arc;

use crate::broadcast::JobEventBroadcaster;
use crate::error::RegistryError;
use crate::job::{Job, JobId, JobRegistry, NewJob, Transition};

/// Couples registry writes with event publication.
///
/// Every change that reaches the registry is published afterwards, so
/// subscribers never see a state the registry does not hold.
#[derive(Clone)]
pub struct JobTracker {
    registry: Arc<JobRegistry>,
    events: JobEventBroadcaster,
}

impl JobTracker {
    pub fn new(registry: Arc<JobRegistry>, events: JobEventBroadcaster) -> Self {
        Self { registry, events }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn events(&self) -> &JobEventBroadcaster {
        &self.events
    }

    /// Registers a new job and announces it.
    pub fn create(&self, new: NewJob) -> Job {
        let job = self.registry.create(new);
        self.events.publish(&job);
        job
    }

    /// Applies a transition and announces the result.
    ///
    /// A rejected transition is an invariant violation inside the
    /// executor: it is logged and nothing is published.
    pub fn apply(&self, id: &JobId, transition: Transition) -> Result<Job, RegistryError> {
        match self.registry.update(id, transition) {
            Ok(job) => {
                self.events.publish(&job);
                Ok(job)
            }
            Err(e) => {
                log::error!("Job {} update rejected: {}", id, e);
                Err(e)
            }
        }
    }
}
