//! Ingestion coordinator: staging, dedup gating, dispatch, status lookups.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StaticConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::ingestion::hash::compute_file_hash;
use crate::jobs::pool::WorkerPool;
use crate::jobs::{JobRegistry, JobView};
use crate::processing::{ProcessDocument, ProcessOutcome, ProcessRequest};
use crate::store::DocumentStore;

/// Orchestrates one upload from raw bytes to either an inline processing
/// result or a pollable background job.
pub struct IngestService {
    store: Arc<dyn DocumentStore>,
    processor: Arc<dyn ProcessDocument>,
    jobs: Arc<JobRegistry>,
    pool: WorkerPool,
    staging_dir: PathBuf,
}

impl IngestService {
    pub fn new(
        config: &StaticConfig,
        store: Arc<dyn DocumentStore>,
        processor: Arc<dyn ProcessDocument>,
        jobs: Arc<JobRegistry>,
        pool: WorkerPool,
    ) -> std::io::Result<Self> {
        let staging_dir = config.storage.staging_dir();
        std::fs::create_dir_all(&staging_dir)?;

        Ok(Self {
            store,
            processor,
            jobs,
            pool,
            staging_dir,
        })
    }

    /// Synchronous ingestion: the caller blocks for the full hash + process
    /// duration and receives the processing result directly. No job record
    /// is created on this path, including when processing fails.
    pub fn upload_sync(
        &self,
        owner_user_id: i64,
        filename: &str,
        content: &[u8],
        replace_document_id: Option<String>,
    ) -> ServiceResult<ProcessOutcome> {
        let (file_path, content_hash) = self.stage(filename, content)?;
        self.reject_duplicate(owner_user_id, &content_hash, replace_document_id.as_deref())?;

        let request = ProcessRequest {
            file_path,
            filename: filename.to_string(),
            owner_user_id,
            content_hash,
            document_id: replace_document_id,
        };
        let outcome = self.processor.process(&request)?;

        info!(
            owner_user_id,
            filename = %filename,
            document_id = %outcome.document_id,
            "Document processed"
        );
        Ok(outcome)
    }

    /// Asynchronous ingestion: stages and gates inline (bounded, fast), then
    /// hands off to the worker pool and returns the job id immediately.
    pub fn upload_async(
        &self,
        owner_user_id: i64,
        filename: &str,
        content: &[u8],
        replace_document_id: Option<String>,
    ) -> ServiceResult<String> {
        let (file_path, content_hash) = self.stage(filename, content)?;
        self.reject_duplicate(owner_user_id, &content_hash, replace_document_id.as_deref())?;

        Ok(self.submit_ingest_job(
            file_path,
            filename,
            owner_user_id,
            content_hash,
            replace_document_id,
        ))
    }

    /// Register a job and queue its processing task. The job is visible to
    /// [`IngestService::job_status`] before the id is returned.
    pub fn submit_ingest_job(
        &self,
        file_path: PathBuf,
        filename: &str,
        owner_user_id: i64,
        content_hash: String,
        document_id: Option<String>,
    ) -> String {
        let job_id = self.jobs.create(format!("Processing {filename}"));

        let processor = self.processor.clone();
        let request = ProcessRequest {
            file_path,
            filename: filename.to_string(),
            owner_user_id,
            content_hash,
            document_id,
        };
        self.pool
            .submit(job_id.clone(), filename.to_string(), move || {
                processor.process(&request)
            });

        info!(
            job_id = %job_id,
            filename = %filename,
            owner_user_id,
            "Ingestion job submitted"
        );
        job_id
    }

    /// Snapshot of a job's current status; `None` for ids never issued.
    pub fn job_status(&self, job_id: &str) -> Option<JobView> {
        self.jobs.get(job_id)
    }

    pub fn tracked_jobs(&self) -> usize {
        self.jobs.job_count()
    }

    /// Persist raw bytes to staging, then fingerprint the staged file.
    /// Staged names carry a random prefix: concurrent uploads may share a
    /// basename, and each must keep its own bytes until its task runs. The
    /// sanitized display name travels separately in the request.
    fn stage(&self, filename: &str, content: &[u8]) -> ServiceResult<(PathBuf, String)> {
        let file_path = self
            .staging_dir
            .join(format!("{}_{}", Uuid::new_v4().simple(), filename));
        std::fs::write(&file_path, content)?;
        let content_hash = compute_file_hash(&file_path)?;
        Ok((file_path, content_hash))
    }

    /// The dedup gate. Runs strictly before job creation or processing so a
    /// known duplicate never consumes a worker slot. A match is allowed
    /// through only when the caller is replacing that same document.
    fn reject_duplicate(
        &self,
        owner_user_id: i64,
        content_hash: &str,
        replace_document_id: Option<&str>,
    ) -> ServiceResult<()> {
        if let Some(existing) = self.store.fetch_document_by_hash(owner_user_id, content_hash) {
            if replace_document_id != Some(existing.id.as_str()) {
                debug!(
                    owner_user_id,
                    existing_document_id = %existing.id,
                    "Duplicate upload rejected"
                );
                return Err(ServiceError::DuplicateDocument {
                    existing_document_id: existing.id,
                    existing_filename: existing.filename,
                });
            }
        }
        Ok(())
    }
}
