//! Pipeline orchestrator: runs the ordered stage sequence for one job and
//! keeps its registry record current.
//!
//! All effects are registry updates; each stage transition is a single
//! atomic update. A stage failure marks the job failed with the stage name
//! and error kind and stops the run — there is no cross-stage recovery and
//! no orchestrator-level retry. If the job disappears from the registry
//! mid-run (deleted), the run aborts before executing further stages.

use std::sync::Arc;

use inkforge_core::job::{JobError, JobResult, JobStatus};
use inkforge_core::progress::{milestone, StageName};
use inkforge_core::types::JobId;
use inkforge_providers::media::{ImageGenerator, VideoGenerator};
use inkforge_providers::text::TextGenerator;

use crate::config::PipelineConfig;
use crate::export::ExportSink;
use crate::registry::JobRegistry;
use crate::stage::StageError;
use crate::stages;

/// Sequences the stage executors for one job at a time.
///
/// Cheap to share; distinct jobs may run through the same orchestrator
/// concurrently, but a single job is only ever run by one task.
pub struct Orchestrator {
    registry: Arc<JobRegistry>,
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    videos: Arc<dyn VideoGenerator>,
    sink: Arc<dyn ExportSink>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<JobRegistry>,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        videos: Arc<dyn VideoGenerator>,
        sink: Arc<dyn ExportSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            registry,
            text,
            images,
            videos,
            sink,
            config,
        }
    }

    /// Run the full stage sequence for `job_id`.
    ///
    /// Precondition: the job exists and is queued. All outcomes are
    /// reported through the registry; this never returns an error.
    pub async fn run(&self, job_id: JobId) {
        let Some(job) = self.registry.get(job_id).await else {
            tracing::warn!(%job_id, "Job missing before run; skipping");
            return;
        };
        if job.status != JobStatus::Queued {
            tracing::warn!(
                %job_id,
                status = job.status.as_str(),
                "Job is not queued; refusing to run",
            );
            return;
        }

        let input = job.input.clone();
        let with_video = input.wants_video();
        tracing::info!(
            %job_id,
            title = %input.title,
            pages = input.target_pages,
            with_video,
            "Starting generation run",
        );

        // queued -> processing, ingest in flight.
        let begun = self
            .registry
            .update(job_id, |j| {
                j.status = JobStatus::Processing;
                j.current_stage = StageName::Ingest.as_str().to_string();
                j.message = "Extracting source text".to_string();
            })
            .await
            .is_ok();
        if !begun {
            tracing::info!(%job_id, "Job deleted before processing started");
            return;
        }

        // -- Ingest --
        let source = match stages::ingest::run(&input.source).await {
            Ok(v) => v,
            Err(e) => return self.fail(job_id, StageName::Ingest, e).await,
        };
        let message = format!("Extracted {} words of source text", source.word_count);
        if self
            .checkpoint(job_id, StageName::Ingest, StageName::Story, message)
            .await
            .is_none()
        {
            return;
        }

        // -- Story --
        let outline = match stages::story::run(&*self.text, &input, &source).await {
            Ok(v) => v,
            Err(e) => return self.fail(job_id, StageName::Story, e).await,
        };
        let message = format!("Story structured into {} scenes", outline.scenes.len());
        if self
            .checkpoint(job_id, StageName::Story, StageName::Script, message)
            .await
            .is_none()
        {
            return;
        }

        // -- Script --
        let script = match stages::script::run(&*self.text, &input, &outline).await {
            Ok(v) => v,
            Err(e) => return self.fail(job_id, StageName::Script, e).await,
        };
        let panel_count = script.panel_count();
        let message = format!("Script ready with {panel_count} panels");
        if self
            .checkpoint(job_id, StageName::Script, StageName::Text, message)
            .await
            .is_none()
        {
            return;
        }

        // -- Text --
        let texts = match stages::text::run(&*self.text, &input, &script).await {
            Ok(v) => v,
            Err(e) => return self.fail(job_id, StageName::Text, e).await,
        };
        let message = format!("Creating artwork for {panel_count} panels");
        if self
            .checkpoint(job_id, StageName::Text, StageName::Visual, message)
            .await
            .is_none()
        {
            return;
        }

        // -- Visual --
        let artwork = match stages::visual::run(&*self.images, &self.config, &input, &script).await
        {
            Ok(v) => v,
            Err(e) => return self.fail(job_id, StageName::Visual, e).await,
        };

        // -- Video (skipped entirely unless requested) --
        let clips = if with_video {
            let message = format!("Animating {panel_count} panels");
            if self
                .checkpoint(job_id, StageName::Visual, StageName::Video, message)
                .await
                .is_none()
            {
                return;
            }
            let clips = match stages::video::run(&*self.videos, &self.config, &input, &script)
                .await
            {
                Ok(v) => v,
                Err(e) => return self.fail(job_id, StageName::Video, e).await,
            };
            if self
                .checkpoint(
                    job_id,
                    StageName::Video,
                    StageName::Assembly,
                    "Assembling output formats".to_string(),
                )
                .await
                .is_none()
            {
                return;
            }
            Some(clips)
        } else {
            if self
                .checkpoint(
                    job_id,
                    StageName::Visual,
                    StageName::Assembly,
                    "Assembling output formats".to_string(),
                )
                .await
                .is_none()
            {
                return;
            }
            None
        };

        // -- Assembly --
        let result = match stages::assembly::run(
            &*self.sink,
            job_id,
            &input,
            &script,
            &texts,
            &artwork,
            clips.as_ref(),
        )
        .await
        {
            Ok(v) => v,
            Err(e) => return self.fail(job_id, StageName::Assembly, e).await,
        };

        self.complete(job_id, result).await;
    }

    /// Record stage completion: progress moves to the completed stage's
    /// milestone, `current_stage` moves to the next stage. One atomic
    /// update. Returns `None` when the job was deleted mid-run.
    async fn checkpoint(
        &self,
        job_id: JobId,
        done: StageName,
        next: StageName,
        message: String,
    ) -> Option<()> {
        tracing::info!(%job_id, stage = done.as_str(), progress = milestone(done), "Stage complete");
        match self
            .registry
            .update(job_id, |j| {
                j.progress = milestone(done);
                j.current_stage = next.as_str().to_string();
                j.message = message;
            })
            .await
        {
            Ok(_) => Some(()),
            Err(_) => {
                tracing::info!(%job_id, "Job deleted mid-run; aborting remaining stages");
                None
            }
        }
    }

    /// Terminal failure: record the stage and taxonomy kind, stop the run.
    async fn fail(&self, job_id: JobId, stage: StageName, error: StageError) {
        tracing::warn!(
            %job_id,
            stage = stage.as_str(),
            kind = error.kind.as_str(),
            error = %error.message,
            "Stage failed; job failed",
        );
        let result = self
            .registry
            .update(job_id, |j| {
                j.status = JobStatus::Failed;
                j.message = format!("{} stage failed", stage.as_str());
                j.error = Some(JobError {
                    stage,
                    kind: error.kind,
                    message: error.message.clone(),
                });
            })
            .await;
        if result.is_err() {
            tracing::info!(%job_id, "Job deleted before failure could be recorded");
        }
    }

    /// Terminal success: result set, progress exactly 1.0.
    async fn complete(&self, job_id: JobId, result: JobResult) {
        tracing::info!(
            %job_id,
            pages = result.total_pages,
            panels = result.total_panels,
            formats = result.artifacts.len(),
            "Comic generation complete",
        );
        let updated = self
            .registry
            .update(job_id, |j| {
                j.status = JobStatus::Completed;
                j.progress = 1.0;
                j.current_stage = "completed".to_string();
                j.message = "Comic generation complete".to_string();
                j.result = Some(result);
            })
            .await;
        if updated.is_err() {
            tracing::info!(%job_id, "Job deleted before completion could be recorded");
        }
    }
}
