//! In-memory job registry.
//!
//! The registry is the single source of truth for job state. Reads hand out
//! snapshots; writes go through [`Transition`] so an illegal update can
//! never be observed.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::model::{Job, JobCounts, JobId, JobResult, JobState, SourceKind};
use super::state::Transition;
use crate::error::RegistryError;

// ─── NewJob ─────────────────────────────────────────────────────────────────

/// Everything needed to register a submitted document.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub source_kind: SourceKind,
    /// Display name. When absent it is derived from the allocated ID.
    pub display_name: Option<String>,
    pub original_text: String,
    pub source_url: Option<String>,
}

impl NewJob {
    /// An uploaded file, shown under its (sanitized) filename.
    pub fn upload(filename: impl Into<String>, original_text: impl Into<String>) -> Self {
        Self {
            source_kind: SourceKind::FileUpload,
            display_name: Some(filename.into()),
            original_text: original_text.into(),
            source_url: None,
        }
    }

    /// Content fetched from a URL, shown as `url_document_<id prefix>.txt`.
    pub fn url(url: impl Into<String>, original_text: impl Into<String>) -> Self {
        Self {
            source_kind: SourceKind::UrlIngestion,
            display_name: None,
            original_text: original_text.into(),
            source_url: Some(url.into()),
        }
    }
}

/// Display name given to URL-ingested documents.
pub fn url_display_name(id: &JobId) -> String {
    format!("url_document_{}.txt", id.short())
}

// ─── JobRegistry ────────────────────────────────────────────────────────────

struct Entry {
    job: Job,
    claimed: bool,
}

/// Thread-safe map from job ID to job record.
///
/// Lock hold times are bounded by a clone or a field assignment; the lock is
/// never held across an await point.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Entry>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, Entry>> {
        match self.jobs.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, Entry>> {
        match self.jobs.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Registers a new job in state `Uploaded` and returns its snapshot.
    pub fn create(&self, new: NewJob) -> Job {
        let mut jobs = self.write();

        let mut id = JobId::generate();
        while jobs.contains_key(&id) {
            log::warn!("Job ID collision on {}, regenerating", id);
            id = JobId::generate();
        }

        let display_name = new
            .display_name
            .unwrap_or_else(|| url_display_name(&id));
        let job = Job::new(
            id.clone(),
            new.source_kind,
            display_name,
            new.original_text,
            new.source_url,
        );

        jobs.insert(
            id,
            Entry {
                job: job.clone(),
                claimed: false,
            },
        );
        job
    }

    /// Returns a snapshot of the job.
    pub fn get(&self, id: &JobId) -> Result<Job, RegistryError> {
        self.read()
            .get(id)
            .map(|entry| entry.job.clone())
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Applies a transition atomically and returns the updated snapshot.
    pub fn update(&self, id: &JobId, transition: Transition) -> Result<Job, RegistryError> {
        let mut jobs = self.write();
        let entry = jobs
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;

        transition.apply(&mut entry.job)?;
        Ok(entry.job.clone())
    }

    /// Marks the job as owned by an executor.
    ///
    /// Only an unclaimed job in state `Uploaded` can be claimed, so at most
    /// one executor ever runs per job.
    pub fn claim(&self, id: &JobId) -> Result<Job, RegistryError> {
        let mut jobs = self.write();
        let entry = jobs
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;

        if entry.claimed {
            return Err(RegistryError::AlreadyClaimed(id.clone()));
        }
        if entry.job.state != JobState::Uploaded {
            return Err(RegistryError::InvalidTransition {
                id: id.clone(),
                from: entry.job.state,
                to: JobState::Processing,
            });
        }

        entry.claimed = true;
        Ok(entry.job.clone())
    }

    /// Returns the improved document of a completed job.
    pub fn result(&self, id: &JobId) -> Result<JobResult, RegistryError> {
        let jobs = self.read();
        let job = &jobs
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?
            .job;

        match (job.state, &job.improved_text, job.completed_at) {
            (JobState::Completed, Some(improved_text), Some(completed_at)) => Ok(JobResult {
                document_id: job.id.clone(),
                original_text: job.original_text.clone(),
                improved_text: improved_text.clone(),
                filename: job.display_name.clone(),
                completed_at,
            }),
            _ => Err(RegistryError::NotReady {
                id: id.clone(),
                state: job.state,
            }),
        }
    }

    /// All jobs, newest first.
    pub fn list(&self) -> Vec<Job> {
        let mut result: Vec<Job> = self.read().values().map(|e| e.job.clone()).collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    pub fn counts(&self) -> JobCounts {
        let mut counts = JobCounts::default();
        for entry in self.read().values() {
            match entry.job.state {
                JobState::Uploaded => counts.uploaded += 1,
                JobState::Processing => counts.processing += 1,
                JobState::Completed => counts.completed += 1,
                JobState::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
