//! Test harness for running submissions end to end against a stub backend.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use docpolish::ai::StubBackend;
use docpolish::config::Config;
use docpolish::{DocumentService, Job, JobId};

/// Upper bound for any single job to settle in these tests.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestHarness {
    pub service: DocumentService,
    pub backend: Arc<StubBackend>,
}

impl TestHarness {
    /// A service whose backend replies with `reply`.
    pub fn replying(reply: &str) -> Self {
        Self::with(Config::default(), StubBackend::reply(reply))
    }

    pub fn with(config: Config, backend: StubBackend) -> Self {
        let backend = Arc::new(backend);
        let service = DocumentService::with_backend(config, backend.clone())
            .expect("Failed to build document service");
        Self { service, backend }
    }

    /// Polls the registry until the job is Completed or Failed.
    pub async fn wait_terminal(&self, id: &JobId) -> Job {
        let poll = async {
            loop {
                let job = self.service.status(id).expect("job should exist");
                if job.state().is_terminal() {
                    return job;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };

        tokio::time::timeout(SETTLE_TIMEOUT, poll)
            .await
            .unwrap_or_else(|_| panic!("job {} did not settle within {:?}", id, SETTLE_TIMEOUT))
    }
}
