//! Job record and its identifying types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── JobId ──────────────────────────────────────────────────────────────────

/// Opaque job identifier (UUID v4 in its hyphenated string form).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, used for derived display names.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ─── JobState ───────────────────────────────────────────────────────────────

/// Lifecycle state of a job.
///
/// `Failed` is spelled `error` on the wire, which is what existing clients
/// match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    #[serde(rename = "uploaded")]
    Uploaded,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "error")]
    Failed,
}

impl JobState {
    /// Completed and Failed accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Uploaded => "uploaded",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "error",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Uploaded => write!(f, "Uploaded"),
            JobState::Processing => write!(f, "Processing"),
            JobState::Completed => write!(f, "Completed"),
            JobState::Failed => write!(f, "Failed"),
        }
    }
}

/// Where the job's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    FileUpload,
    UrlIngestion,
}

// ─── Job ────────────────────────────────────────────────────────────────────

/// One document-improvement request and its lifecycle record.
///
/// Fields are private so that every mutation goes through
/// [`Transition::apply`](super::Transition::apply), which keeps `state`,
/// `improved_text` and `error_detail` consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub(crate) id: JobId,
    pub(crate) source_kind: SourceKind,
    #[serde(rename = "filename")]
    pub(crate) display_name: String,
    pub(crate) original_text: String,
    #[serde(rename = "status")]
    pub(crate) state: JobState,
    pub(crate) progress: u8,
    pub(crate) improved_text: Option<String>,
    #[serde(rename = "error")]
    pub(crate) error_detail: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) source_url: Option<String>,
}

impl Job {
    /// Builds a freshly submitted job in state `Uploaded` with progress 0.
    pub fn new(
        id: JobId,
        source_kind: SourceKind,
        display_name: impl Into<String>,
        original_text: impl Into<String>,
        source_url: Option<String>,
    ) -> Self {
        Self {
            id,
            source_kind,
            display_name: display_name.into(),
            original_text: original_text.into(),
            state: JobState::Uploaded,
            progress: 0,
            improved_text: None,
            error_detail: None,
            created_at: Utc::now(),
            completed_at: None,
            source_url,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn improved_text(&self) -> Option<&str> {
        self.improved_text.as_deref()
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }
}

/// The completed output of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub document_id: JobId,
    pub original_text: String,
    pub improved_text: String,
    pub filename: String,
    pub completed_at: DateTime<Utc>,
}

/// Number of jobs in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub uploaded: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl JobCounts {
    pub fn total(&self) -> usize {
        self.uploaded + self.processing + self.completed + self.failed
    }
}
