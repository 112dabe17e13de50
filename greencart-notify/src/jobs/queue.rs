//! In-process job queue.

use chrono::Utc;
use futures_util::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{CancellationToken, Job, JobContext, JobError, JobId, JobResult, JobStatus};

#[derive(Debug)]
struct TrackedJob {
    job_type: &'static str,
    status: JobStatus,
    token: CancellationToken,
}

/// Runs jobs on the tokio runtime with bounded parallelism.
///
/// Each job runs at most once: the queue records how it ended and never
/// re-enqueues it.
#[derive(Debug, Clone)]
pub struct JobQueue {
    context: Arc<JobContext>,
    permits: Arc<Semaphore>,
    jobs: Arc<RwLock<HashMap<JobId, TrackedJob>>>,
}

/// Handle to an enqueued job.
#[derive(Debug)]
pub struct JobHandle<T> {
    id: JobId,
    handle: JoinHandle<JobResult<T>>,
}

impl<T> JobHandle<T> {
    /// Job identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Wait for the job to finish.
    ///
    /// # Errors
    ///
    /// Returns the job's own error, `JobError::Cancelled` if it was cancelled,
    /// or `JobError::Panicked` if the task died.
    pub async fn wait(self) -> JobResult<T> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(JobError::Cancelled),
            Err(e) => Err(JobError::Panicked(e.to_string())),
        }
    }
}

impl JobQueue {
    /// Create a queue running at most `workers` jobs at once.
    ///
    /// A worker count of zero is treated as one.
    #[must_use]
    pub fn new(context: JobContext, workers: usize) -> Self {
        Self {
            context: Arc::new(context),
            permits: Arc::new(Semaphore::new(workers.max(1))),
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Shared job context.
    #[must_use]
    pub fn context(&self) -> &JobContext {
        &self.context
    }

    /// Enqueue a job. Must be called from within a tokio runtime.
    pub fn enqueue<J: Job>(&self, job: J) -> JobHandle<J::Result> {
        let id = JobId::new();
        let token = CancellationToken::new();
        let job_type = job.job_type();

        self.jobs.write().insert(
            id,
            TrackedJob {
                job_type,
                status: JobStatus::Pending,
                token: token.clone(),
            },
        );
        debug!(job_id = %id, job_type, "Job enqueued");

        let context = Arc::clone(&self.context);
        let permits = Arc::clone(&self.permits);
        let jobs = Arc::clone(&self.jobs);

        let handle = tokio::spawn(async move {
            let run = async {
                let Ok(_permit) = permits.acquire().await else {
                    return Err(JobError::ExecutionFailed("job queue closed".to_string()));
                };
                set_status(&jobs, id, JobStatus::Running {
                    started_at: Utc::now(),
                });

                AssertUnwindSafe(job.execute(&context))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(JobError::Panicked(panic_message(&*panic))))
            };

            let result = token.run_until_cancelled(run).await.and_then(|r| r);
            record(&jobs, id, job_type, &result);
            result
        });

        JobHandle { id, handle }
    }

    /// Current status of a job.
    #[must_use]
    pub fn status(&self, id: &JobId) -> Option<JobStatus> {
        self.jobs.read().get(id).map(|job| job.status.clone())
    }

    /// Request cancellation of a job.
    ///
    /// # Errors
    ///
    /// Returns `JobError::NotFound` if the queue does not know the job.
    pub fn cancel(&self, id: &JobId) -> JobResult<()> {
        let jobs = self.jobs.read();
        let job = jobs
            .get(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;

        if job.status.is_terminal() {
            warn!(job_id = %id, status = %job.status, "Cannot cancel finished job");
        } else {
            job.token.cancel();
            info!(job_id = %id, job_type = job.job_type, "Job cancellation requested");
        }
        Ok(())
    }

    /// Number of jobs not yet finished.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.jobs
            .read()
            .values()
            .filter(|job| !job.status.is_terminal())
            .count()
    }

    /// Forget finished jobs, returning how many were removed.
    pub fn purge_finished(&self) -> usize {
        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, job| !job.status.is_terminal());
        before - jobs.len()
    }
}

fn set_status(jobs: &RwLock<HashMap<JobId, TrackedJob>>, id: JobId, status: JobStatus) {
    if let Some(job) = jobs.write().get_mut(&id) {
        job.status = status;
    }
}

fn record<T>(
    jobs: &RwLock<HashMap<JobId, TrackedJob>>,
    id: JobId,
    job_type: &'static str,
    result: &JobResult<T>,
) {
    let now = Utc::now();
    let status = match result {
        Ok(_) => {
            debug!(job_id = %id, job_type, "Job completed");
            JobStatus::Completed { completed_at: now }
        }
        Err(JobError::Cancelled) => {
            info!(job_id = %id, job_type, "Job cancelled");
            JobStatus::Cancelled { cancelled_at: now }
        }
        Err(e) => {
            error!(job_id = %id, job_type, error = %e, "Job failed");
            JobStatus::Failed {
                failed_at: now,
                error: e.to_string(),
            }
        }
    };
    set_status(jobs, id, status);
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
