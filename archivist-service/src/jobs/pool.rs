//! Bounded worker pool running processing tasks off the request path.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::ProcessingError;
use crate::jobs::JobRegistry;
use crate::processing::ProcessOutcome;

/// Fixed-capacity pool of execution slots. Submission never blocks the
/// caller; tasks beyond the slot count queue on the semaphore until a slot
/// frees. Built once at startup with its slot count and injected wherever
/// work is dispatched.
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    registry: Arc<JobRegistry>,
}

impl WorkerPool {
    pub fn new(slot_count: usize, registry: Arc<JobRegistry>) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(slot_count)),
            registry,
        }
    }

    /// Run `task` asynchronously on a free slot, then record the outcome on
    /// the job. A task fault, error or panic, is contained here: it marks
    /// the one affected job failed and leaves the pool and every other job
    /// untouched.
    pub fn submit<F>(&self, job_id: String, filename: String, task: F)
    where
        F: FnOnce() -> Result<ProcessOutcome, ProcessingError> + Send + 'static,
    {
        let slots = self.slots.clone();
        let registry = self.registry.clone();

        tokio::spawn(async move {
            let _permit = match slots.acquire_owned().await {
                Ok(permit) => permit,
                // Only reachable if the semaphore were closed, which the
                // pool never does.
                Err(_) => {
                    registry.mark_failed(&job_id, "Failed: worker pool unavailable");
                    return;
                }
            };

            // Processing is CPU-bound; keep it off the async executor
            match tokio::task::spawn_blocking(task).await {
                Ok(Ok(result)) => {
                    info!(job_id = %job_id, filename = %filename, "Ingestion job completed");
                    registry.mark_completed(
                        &job_id,
                        format!("Processed {filename} successfully"),
                        result,
                    );
                }
                Ok(Err(err)) => {
                    warn!(job_id = %job_id, filename = %filename, error = %err, "Ingestion job failed");
                    registry.mark_failed(&job_id, format!("Failed: {err}"));
                }
                Err(join_err) => {
                    warn!(job_id = %job_id, filename = %filename, error = %join_err, "Ingestion task panicked");
                    registry.mark_failed(&job_id, format!("Failed: {join_err}"));
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{JobState, JobView};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn outcome() -> ProcessOutcome {
        ProcessOutcome {
            document_id: "doc".to_string(),
            text_chunks: 0,
            image_chunks: 0,
        }
    }

    async fn wait_for_terminal(registry: &JobRegistry, job_id: &str) -> JobView {
        for _ in 0..500 {
            if let Some(view) = registry.get(job_id) {
                if view.state != JobState::Processing {
                    return view;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {job_id} did not reach a terminal state");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn all_tasks_finish_with_bounded_concurrency() {
        let registry = Arc::new(JobRegistry::new());
        let pool = WorkerPool::new(2, registry.clone());

        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut job_ids = Vec::new();
        for i in 0..6 {
            let job_id = registry.create(format!("Processing doc-{i}.pdf"));
            let running = running.clone();
            let peak = peak.clone();
            pool.submit(job_id.clone(), format!("doc-{i}.pdf"), move || {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(50));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(outcome())
            });
            job_ids.push(job_id);
        }

        for job_id in &job_ids {
            let view = wait_for_terminal(&registry, job_id).await;
            assert_eq!(view.state, JobState::Completed);
        }

        assert!(
            peak.load(Ordering::SeqCst) <= 2,
            "observed {} concurrent tasks on a 2-slot pool",
            peak.load(Ordering::SeqCst)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn task_error_is_recorded_with_its_message() {
        let registry = Arc::new(JobRegistry::new());
        let pool = WorkerPool::new(2, registry.clone());

        let job_id = registry.create("Processing broken.pdf");
        pool.submit(job_id.clone(), "broken.pdf".to_string(), || {
            Err(ProcessingError::Io(std::io::Error::other("disk full")))
        });

        let view = wait_for_terminal(&registry, &job_id).await;
        assert_eq!(view.state, JobState::Failed);
        // Message carries both the fault's type and its text
        assert!(view.message.contains("disk full"), "message: {}", view.message);
        assert!(view.message.contains("io error"), "message: {}", view.message);
        assert!(view.result.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn one_fault_does_not_affect_other_jobs() {
        let registry = Arc::new(JobRegistry::new());
        let pool = WorkerPool::new(2, registry.clone());

        let failing = registry.create("Processing bad.pdf");
        pool.submit(failing.clone(), "bad.pdf".to_string(), || {
            Err(ProcessingError::Backend {
                message: "corrupt xref table".to_string(),
            })
        });

        let panicking = registry.create("Processing worse.pdf");
        pool.submit(panicking.clone(), "worse.pdf".to_string(), || {
            panic!("unexpected")
        });

        let fine = registry.create("Processing good.pdf");
        pool.submit(fine.clone(), "good.pdf".to_string(), || Ok(outcome()));

        let failing_view = wait_for_terminal(&registry, &failing).await;
        assert_eq!(failing_view.state, JobState::Failed);
        assert!(
            failing_view
                .message
                .contains("backend error: corrupt xref table"),
            "message: {}",
            failing_view.message
        );
        assert_eq!(
            wait_for_terminal(&registry, &panicking).await.state,
            JobState::Failed
        );
        assert_eq!(
            wait_for_terminal(&registry, &fine).await.state,
            JobState::Completed
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn submission_returns_before_the_task_runs() {
        let registry = Arc::new(JobRegistry::new());
        let pool = WorkerPool::new(1, registry.clone());

        // Occupy the only slot, then submit more; submit must not block even
        // though no slot is free.
        for i in 0..3 {
            let job_id = registry.create(format!("Processing slow-{i}.pdf"));
            pool.submit(job_id.clone(), format!("slow-{i}.pdf"), move || {
                std::thread::sleep(Duration::from_millis(30));
                Ok(ProcessOutcome {
                    document_id: format!("doc-{i}"),
                    text_chunks: 0,
                    image_chunks: 0,
                })
            });
            // The job is already pollable as processing
            assert_eq!(
                registry.get(&job_id).unwrap().state,
                JobState::Processing
            );
        }
    }
}
