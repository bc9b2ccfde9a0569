//! Background execution of improvement jobs.
//!
//! Each job runs on its own tokio task and talks to the rest of the
//! system only through [`JobTracker`]: registry update first, then event.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use log::{debug, info, warn};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{info_span, Instrument};

use crate::ai::{GenerateOptions, LlmBackend};
use crate::config::{ExecutorConfig, LlmConfig};
use crate::error::{BackendError, RegistryError};
use crate::job::{Job, JobId, Transition};

use super::error::PipelineError;
use super::progress::JobTracker;
use super::prompt::{build_prompt, prompt_len};

#[derive(Clone)]
pub struct JobExecutor {
    tracker: JobTracker,
    backend: Arc<dyn LlmBackend>,
    options: GenerateOptions,
    timeout_secs: u64,
    max_prompt_chars: usize,
    permits: Option<Arc<Semaphore>>,
}

impl JobExecutor {
    pub fn new(
        tracker: JobTracker,
        backend: Arc<dyn LlmBackend>,
        llm: &LlmConfig,
        executor: &ExecutorConfig,
    ) -> Self {
        let permits = executor
            .max_concurrent_jobs
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        Self {
            tracker,
            backend,
            options: GenerateOptions::from_config(llm),
            timeout_secs: llm.timeout_secs,
            max_prompt_chars: executor.max_prompt_chars,
            permits,
        }
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    /// Claims the job and starts processing it in the background.
    ///
    /// Returns as soon as the task is spawned. Fails if the job is unknown,
    /// already claimed or no longer Uploaded.
    pub fn spawn(&self, id: &JobId) -> Result<JoinHandle<()>, RegistryError> {
        let job = self.tracker.registry().claim(id)?;

        let span = info_span!("job", job_id = %job.id(), filename = %job.display_name());
        let executor = self.clone();
        Ok(tokio::spawn(async move { executor.run(job).await }.instrument(span)))
    }

    /// Stops admitting queued jobs. Jobs still waiting for a slot fail;
    /// jobs already running are left to finish. No-op without a cap.
    pub fn shutdown(&self) {
        if let Some(permits) = &self.permits {
            info!(
                "Closing executor, {} slots free",
                permits.available_permits()
            );
            permits.close();
        }
    }

    async fn run(self, job: Job) {
        let id = job.id().clone();

        let _permit = match self.acquire_permit().await {
            Ok(permit) => permit,
            Err(e) => {
                self.finish_failed(&id, e.to_string());
                return;
            }
        };

        let prompt = match self.prepare(job.original_text()) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Job {} failed pre-flight: {}", id, e);
                self.finish_failed(&id, e.to_string());
                return;
            }
        };

        if self.tracker.apply(&id, Transition::Start).is_err() {
            return;
        }

        info!(
            "Sending job {} to model {} ({} chars)",
            id,
            self.options.model,
            job.original_text().len()
        );

        match self.generate(&prompt).await {
            Ok(improved_text) => {
                info!(
                    "Job {} completed, {} chars generated",
                    id,
                    improved_text.len()
                );
                let _ = self
                    .tracker
                    .apply(&id, Transition::Complete { improved_text });
            }
            Err(e) => {
                warn!("Job {} failed: {}", id, e);
                self.finish_failed(&id, e.to_string());
            }
        }
    }

    async fn acquire_permit(&self) -> Result<Option<OwnedSemaphorePermit>, PipelineError> {
        let Some(permits) = &self.permits else {
            return Ok(None);
        };

        debug!(
            "Waiting for an executor slot ({} free)",
            permits.available_permits()
        );
        permits
            .clone()
            .acquire_owned()
            .await
            .map(Some)
            .map_err(|_| PipelineError::ShuttingDown)
    }

    fn prepare(&self, text: &str) -> Result<String, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyText);
        }

        let len = prompt_len(text);
        if len > self.max_prompt_chars {
            return Err(PipelineError::PromptTooLong {
                len,
                limit: self.max_prompt_chars,
            });
        }

        Ok(build_prompt(text))
    }

    /// A panicking backend fails the job like any other backend error.
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        let call = AssertUnwindSafe(self.backend.generate(prompt, &self.options)).catch_unwind();
        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), call).await {
            Ok(Ok(result)) => result.map_err(PipelineError::from),
            Ok(Err(panic)) => Err(PipelineError::BackendPanicked(panic_message(panic.as_ref()))),
            Err(_) => Err(BackendError::Timeout(self.timeout_secs).into()),
        }
    }

    fn finish_failed(&self, id: &JobId, error: String) {
        let _ = self.tracker.apply(id, Transition::Fail { error });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::StubBackend;
    use crate::broadcast::JobEventBroadcaster;
    use crate::job::{JobRegistry, JobState, NewJob};

    fn executor_with(
        backend: Arc<dyn LlmBackend>,
        executor: ExecutorConfig,
    ) -> JobExecutor {
        let tracker = JobTracker::new(Arc::new(JobRegistry::new()), JobEventBroadcaster::new(64));
        let llm = LlmConfig {
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        JobExecutor::new(tracker, backend, &llm, &executor)
    }

    fn submit(executor: &JobExecutor, text: &str) -> JobId {
        executor
            .tracker()
            .create(NewJob::upload("doc.md", text))
            .id()
            .clone()
    }

    #[tokio::test]
    async fn test_successful_job_completes() {
        let stub = Arc::new(StubBackend::reply("# Improved"));
        let executor = executor_with(stub.clone(), ExecutorConfig::default());
        let id = submit(&executor, "Hello");

        executor.spawn(&id).unwrap().await.unwrap();

        let job = executor.tracker().registry().get(&id).unwrap();
        assert_eq!(job.state(), JobState::Completed);
        assert_eq!(job.progress(), 100);
        assert_eq!(job.improved_text(), Some("# Improved"));
        assert_eq!(stub.generate_calls(), 1);
        assert!(stub.prompts()[0].contains("Original Documentation:\nHello"));
    }

    #[tokio::test]
    async fn test_event_sequence() {
        let stub = Arc::new(StubBackend::reply("done"));
        let executor = executor_with(stub, ExecutorConfig::default());
        let id = submit(&executor, "Hello");
        let mut rx = executor.tracker().events().subscribe();

        executor.spawn(&id).unwrap().await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.status, JobState::Processing);
        assert_eq!(first.progress, 10);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.status, JobState::Completed);
        assert_eq!(second.improved_text.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_backend_error_fails_job() {
        let stub = Arc::new(StubBackend::failing(BackendError::Status {
            status: 500,
            body: "model not found".to_string(),
        }));
        let executor = executor_with(stub, ExecutorConfig::default());
        let id = submit(&executor, "Hello");

        executor.spawn(&id).unwrap().await.unwrap();

        let job = executor.tracker().registry().get(&id).unwrap();
        assert_eq!(job.state(), JobState::Failed);
        assert!(job.error_detail().unwrap().contains("model not found"));
        assert!(job.completed_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_backend_times_out() {
        let stub = Arc::new(StubBackend::hanging());
        let executor = executor_with(stub, ExecutorConfig::default());
        let id = submit(&executor, "Hello");

        executor.spawn(&id).unwrap().await.unwrap();

        let job = executor.tracker().registry().get(&id).unwrap();
        assert_eq!(job.state(), JobState::Failed);
        assert!(job.error_detail().unwrap().contains("5 seconds"));
    }

    #[tokio::test]
    async fn test_blank_text_fails_before_backend() {
        let stub = Arc::new(StubBackend::reply("never"));
        let executor = executor_with(stub.clone(), ExecutorConfig::default());
        let id = submit(&executor, "  \n\t ");
        let mut rx = executor.tracker().events().subscribe();

        executor.spawn(&id).unwrap().await.unwrap();

        let job = executor.tracker().registry().get(&id).unwrap();
        assert_eq!(job.state(), JobState::Failed);
        assert_eq!(job.progress(), 0);
        assert_eq!(stub.generate_calls(), 0);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.status, JobState::Failed);
    }

    #[tokio::test]
    async fn test_oversized_prompt_fails_before_backend() {
        let stub = Arc::new(StubBackend::reply("never"));
        let config = ExecutorConfig {
            max_prompt_chars: 100,
            ..ExecutorConfig::default()
        };
        let executor = executor_with(stub.clone(), config);
        let id = submit(&executor, "short text");

        executor.spawn(&id).unwrap().await.unwrap();

        let job = executor.tracker().registry().get(&id).unwrap();
        assert_eq!(job.state(), JobState::Failed);
        assert!(job.error_detail().unwrap().contains("limit is 100"));
        assert_eq!(stub.generate_calls(), 0);
    }

    #[tokio::test]
    async fn test_second_spawn_is_rejected() {
        let stub = Arc::new(StubBackend::reply("ok"));
        let executor = executor_with(stub.clone(), ExecutorConfig::default());
        let id = submit(&executor, "Hello");

        let handle = executor.spawn(&id).unwrap();
        assert!(matches!(
            executor.spawn(&id),
            Err(RegistryError::AlreadyClaimed(_))
        ));
        handle.await.unwrap();

        assert_eq!(stub.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_spawn_unknown_job() {
        let executor = executor_with(Arc::new(StubBackend::reply("ok")), ExecutorConfig::default());
        let result = executor.spawn(&JobId::from("missing"));
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrency_cap() {
        let stub = Arc::new(StubBackend::reply("ok").with_delay(Duration::from_millis(50)));
        let config = ExecutorConfig {
            max_concurrent_jobs: Some(2),
            ..ExecutorConfig::default()
        };
        let executor = executor_with(stub.clone(), config);

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let id = submit(&executor, &format!("doc {}", i));
                executor.spawn(&id).unwrap()
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(stub.generate_calls(), 6);
        assert!(stub.max_in_flight() <= 2);
        assert_eq!(executor.tracker().registry().counts().completed, 6);
    }

    #[tokio::test]
    async fn test_panicking_backend_fails_job() {
        let stub = Arc::new(StubBackend::panicking("model crashed"));
        let executor = executor_with(stub, ExecutorConfig::default());
        let id = submit(&executor, "Hello");

        executor.spawn(&id).unwrap().await.unwrap();

        let job = executor.tracker().registry().get(&id).unwrap();
        assert_eq!(job.state(), JobState::Failed);
        assert!(job.error_detail().unwrap().contains("model crashed"));
        assert!(job.completed_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_fails_queued_jobs() {
        let stub = Arc::new(StubBackend::hanging());
        let config = ExecutorConfig {
            max_concurrent_jobs: Some(1),
            ..ExecutorConfig::default()
        };
        let executor = executor_with(stub, config);
        let registry = Arc::clone(executor.tracker().registry());

        let running = submit(&executor, "first");
        let running_handle = executor.spawn(&running).unwrap();
        while registry.get(&running).unwrap().state() != JobState::Processing {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let queued = submit(&executor, "second");
        let queued_handle = executor.spawn(&queued).unwrap();
        executor.shutdown();
        queued_handle.await.unwrap();

        let job = registry.get(&queued).unwrap();
        assert_eq!(job.state(), JobState::Failed);
        assert_eq!(job.error_detail(), Some("Executor is shutting down"));

        running_handle.await.unwrap();
        let job = registry.get(&running).unwrap();
        assert_eq!(job.state(), JobState::Failed);
        assert!(job.error_detail().unwrap().contains("5 seconds"));
    }

    #[tokio::test]
    async fn test_shutdown_without_cap_is_noop() {
        let stub = Arc::new(StubBackend::reply("ok"));
        let executor = executor_with(stub, ExecutorConfig::default());
        executor.shutdown();

        let id = submit(&executor, "Hello");
        executor.spawn(&id).unwrap().await.unwrap();

        let job = executor.tracker().registry().get(&id).unwrap();
        assert_eq!(job.state(), JobState::Completed);
    }
}
