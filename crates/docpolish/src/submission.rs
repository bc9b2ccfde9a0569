//! Entry point for submitting documents and reading back their jobs.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::ai::{LlmBackend, ModelManager, OllamaBackend};
use crate::broadcast::{JobEvent, JobEventBroadcaster};
use crate::config::{Config, DocumentFormat};
use crate::error::{
    DocpolishError, ExtractionError, RegistryError, SubmissionError, ValidationError,
};
use crate::job::{Job, JobCounts, JobId, JobRegistry, JobResult, JobState, NewJob, SourceKind};
use crate::pipeline::{JobExecutor, JobTracker};
use crate::processor::{validate_url, ProcessorRegistry, UrlFetcher};
use crate::sanitize;

const UPLOAD_MESSAGE: &str = "Document uploaded and processing started";
const URL_MESSAGE: &str = "URL content ingested and processing started";

/// Acknowledgement of an accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub document_id: JobId,
    pub filename: String,
    pub status: JobState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Receipt {
    fn for_job(job: &Job) -> Self {
        let message = match job.source_kind() {
            SourceKind::FileUpload => UPLOAD_MESSAGE,
            SourceKind::UrlIngestion => URL_MESSAGE,
        };

        Self {
            document_id: job.id().clone(),
            filename: job.display_name().to_string(),
            status: job.state(),
            message: message.to_string(),
            source_url: job.source_url().map(str::to_string),
        }
    }
}

/// Validates and extracts submissions, registers their jobs and starts
/// the background executor for each.
///
/// Submitting must happen inside a tokio runtime.
pub struct DocumentService {
    config: Arc<Config>,
    tracker: JobTracker,
    executor: JobExecutor,
    processors: Arc<ProcessorRegistry>,
    fetcher: UrlFetcher,
    models: ModelManager,
}

impl DocumentService {
    /// Production constructor, talking to the configured Ollama service.
    pub fn from_config(config: Config) -> Result<Self, DocpolishError> {
        let backend = OllamaBackend::from_config(&config.llm)?;
        Self::with_backend(config, Arc::new(backend))
    }

    pub fn with_backend(
        config: Config,
        backend: Arc<dyn LlmBackend>,
    ) -> Result<Self, DocpolishError> {
        let fetcher = UrlFetcher::new(&config.ingestion)?;
        let tracker = JobTracker::new(
            Arc::new(JobRegistry::new()),
            JobEventBroadcaster::new(config.executor.event_capacity),
        );
        let executor = JobExecutor::new(
            tracker.clone(),
            backend.clone(),
            &config.llm,
            &config.executor,
        );
        let models = ModelManager::from_config(backend, &config.llm);

        Ok(Self {
            config: Arc::new(config),
            tracker,
            executor,
            processors: Arc::new(ProcessorRegistry::new()),
            fetcher,
            models,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn models(&self) -> &ModelManager {
        &self.models
    }

    /// Accepts an uploaded file.
    ///
    /// The name must carry an allowed extension and the content must fit
    /// the upload limit. The stored name is sanitized. Extraction runs on
    /// the blocking pool.
    pub async fn submit_upload<B>(
        &self,
        filename: &str,
        bytes: B,
    ) -> Result<Receipt, SubmissionError>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let ingestion = &self.config.ingestion;
        let size = bytes.as_ref().len();

        if filename.trim().is_empty() {
            return Err(ValidationError::EmptyFilename.into());
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let format = DocumentFormat::from_extension(&extension)
            .filter(|_| ingestion.is_allowed(&extension))
            .ok_or_else(|| ValidationError::FileTypeNotAllowed {
                extension: extension.clone(),
            })?;

        if size > ingestion.max_upload_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                limit: ingestion.max_upload_bytes,
            }
            .into());
        }

        let safe_name = stored_filename(filename, &extension);
        debug!(
            "Extracting {} ({}, {} bytes)",
            safe_name,
            mime_guess::from_path(&safe_name).first_or_octet_stream(),
            size
        );

        let processors = Arc::clone(&self.processors);
        let text = tokio::task::spawn_blocking(move || {
            processors.extract_format(format, bytes.as_ref())
        })
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))??;

        self.submit_text(SourceKind::FileUpload, Some(safe_name), text, None)
    }

    /// Fetches a web page and submits its text.
    pub async fn submit_url(&self, url: Option<&str>) -> Result<Receipt, SubmissionError> {
        let url = validate_url(url)?;
        info!("Ingesting content from {}", sanitize::redact_url(&url));

        let text = self.fetcher.fetch_text(&url).await?;
        self.submit_text(SourceKind::UrlIngestion, None, text, Some(url))
    }

    /// Registers already-extracted text and starts processing it.
    pub fn submit_text(
        &self,
        source_kind: SourceKind,
        display_name: Option<String>,
        text: String,
        source_url: Option<String>,
    ) -> Result<Receipt, SubmissionError> {
        let job = self.tracker.create(NewJob {
            source_kind,
            display_name,
            original_text: text,
            source_url,
        });
        info!(
            "Registered job {} for {} ({} chars)",
            job.id(),
            job.display_name(),
            job.original_text().len()
        );

        self.executor.spawn(job.id())?;
        Ok(Receipt::for_job(&job))
    }

    pub fn status(&self, id: &JobId) -> Result<Job, RegistryError> {
        self.tracker.registry().get(id)
    }

    pub fn result(&self, id: &JobId) -> Result<JobResult, RegistryError> {
        self.tracker.registry().result(id)
    }

    /// All jobs, newest first.
    pub fn list(&self) -> Vec<Job> {
        self.tracker.registry().list()
    }

    pub fn counts(&self) -> JobCounts {
        self.tracker.registry().counts()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.tracker.events().subscribe()
    }

    /// Fails jobs still queued for an executor slot. Running jobs finish.
    pub fn shutdown(&self) {
        self.executor.shutdown();
    }
}

/// Sanitized upload name that keeps the extension, or `document.<ext>`.
fn stored_filename(filename: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension);
    sanitize::secure_filename(filename)
        .filter(|name| name.len() > suffix.len() && name.to_lowercase().ends_with(&suffix))
        .unwrap_or_else(|| format!("document{}", suffix))
}
