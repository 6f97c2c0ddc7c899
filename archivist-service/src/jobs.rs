//! In-memory registry of asynchronous ingestion jobs.
//!
//! The registry exclusively owns every job record in the process. All
//! mutation goes through the transition methods; readers only ever receive
//! snapshots. Terminal jobs are retained for polling (no eviction).

pub mod pool;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::processing::ProcessOutcome;

/// Lifecycle state of a job. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
struct Job {
    state: JobState,
    message: String,
    result: Option<ProcessOutcome>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Snapshot of a job's fields at lookup time, never a live reference.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub state: JobState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ProcessOutcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct JobRegistry {
    jobs: DashMap<String, Job>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job in the `processing` state and return its id: a
    /// random 128-bit token rendered as hex, never reused. The record is
    /// visible to [`JobRegistry::get`] before the id is handed back.
    pub fn create(&self, message: impl Into<String>) -> String {
        let job_id = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        self.jobs.insert(
            job_id.clone(),
            Job {
                state: JobState::Processing,
                message: message.into(),
                result: None,
                created_at: now,
                updated_at: now,
            },
        );
        job_id
    }

    /// Transition `processing -> completed`, storing the result. Unknown ids
    /// and jobs already in a terminal state are left untouched.
    pub fn mark_completed(
        &self,
        job_id: &str,
        message: impl Into<String>,
        result: ProcessOutcome,
    ) {
        if let Some(mut job) = self.jobs.get_mut(job_id) {
            if job.state != JobState::Processing {
                return;
            }
            job.state = JobState::Completed;
            job.message = message.into();
            job.result = Some(result);
            job.updated_at = Utc::now();
        }
    }

    /// Transition `processing -> failed`. The result stays unset. Same no-op
    /// rules as [`JobRegistry::mark_completed`].
    pub fn mark_failed(&self, job_id: &str, message: impl Into<String>) {
        if let Some(mut job) = self.jobs.get_mut(job_id) {
            if job.state != JobState::Processing {
                return;
            }
            job.state = JobState::Failed;
            job.message = message.into();
            job.updated_at = Utc::now();
        }
    }

    /// Snapshot lookup. `None` means the id was never issued, which is
    /// distinct from a job that ran and failed.
    pub fn get(&self, job_id: &str) -> Option<JobView> {
        self.jobs.get(job_id).map(|job| JobView {
            state: job.state,
            message: job.message.clone(),
            result: job.result.clone(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
    }

    /// Number of jobs tracked, terminal ones included.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}
