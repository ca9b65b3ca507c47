//! Bounded fire-and-forget job scheduling.
//!
//! The request boundary hands a job id to [`JobRunner::spawn`] and keeps no
//! other reference to the work; the orchestrator communicates solely
//! through registry updates. Cross-job concurrency is bounded by a
//! semaphore so a burst of requests cannot overwhelm the providers.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use inkforge_core::types::JobId;

use crate::orchestrator::Orchestrator;

/// Schedules orchestrator runs as background tasks.
pub struct JobRunner {
    orchestrator: Arc<Orchestrator>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl JobRunner {
    /// Create a runner allowing at most `max_concurrent_jobs` pipelines in
    /// flight at once. Further jobs queue on the semaphore in spawn order.
    pub fn new(orchestrator: Arc<Orchestrator>, max_concurrent_jobs: usize) -> Self {
        Self {
            orchestrator,
            semaphore: Arc::new(Semaphore::new(max_concurrent_jobs)),
            cancel: CancellationToken::new(),
        }
    }

    /// Schedule a queued job to run in the background and return
    /// immediately.
    pub fn spawn(&self, job_id: JobId) {
        let orchestrator = Arc::clone(&self.orchestrator);
        let semaphore = Arc::clone(&self.semaphore);
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(%job_id, "Runner shut down before job could start");
                    return;
                }
                permit = semaphore.acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => return,
                }
            };

            orchestrator.run(job_id).await;
            drop(permit);
        });
    }

    /// Stop admitting queued jobs. Pipelines already running are left to
    /// finish; there is no mid-pipeline cancellation.
    pub fn shutdown(&self) {
        tracing::info!("Job runner shutting down");
        self.cancel.cancel();
    }
}
