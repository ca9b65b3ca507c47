//! In-memory job registry.
//!
//! The registry is the only shared mutable state in the system. All
//! mutations go through [`JobRegistry::update`], which applies the change
//! and bumps `updated_at` under the write lock, so concurrent readers
//! observe either the pre- or post-update job, never a torn mix of fields.
//! A job is owned by the orchestrator task processing it until terminal;
//! the registry itself only enforces the atomic-replace contract.

use std::collections::HashMap;

use tokio::sync::RwLock;

use inkforge_core::generation::GenerationInput;
use inkforge_core::job::{Job, JobSummary};
use inkforge_core::types::JobId;

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No job with the given id exists (never created, or deleted).
    #[error("Job {0} not found")]
    NotFound(JobId),
}

/// Thread-safe map of job id to job state.
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queued job for the given input and return a snapshot of it.
    pub async fn create(&self, input: GenerationInput) -> Job {
        let job = Job::new(input);
        self.jobs.write().await.insert(job.id, job.clone());
        tracing::info!(job_id = %job.id, title = %job.input.title, "Job created");
        job
    }

    /// Snapshot of a job, if it exists.
    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Apply a mutation to a job atomically and return the updated
    /// snapshot. Refreshes `updated_at`.
    pub async fn update<F>(&self, id: JobId, mutate: F) -> Result<Job, RegistryError>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        mutate(job);
        job.updated_at = chrono::Utc::now();
        Ok(job.clone())
    }

    /// Summaries of all jobs, newest first.
    pub async fn list(&self) -> Vec<JobSummary> {
        let jobs = self.jobs.read().await;
        let mut summaries: Vec<JobSummary> = jobs.values().map(Job::summary).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Remove a job, returning its final state so the caller can clean up
    /// artifacts.
    pub async fn delete(&self, id: JobId) -> Result<Job, RegistryError> {
        self.jobs
            .write()
            .await
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
