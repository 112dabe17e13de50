//! Core job trait and types.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{JobContext, JobResult};

/// Unique identifier for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Create a new random job ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for JobId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A unit of deferred work.
///
/// Jobs are plain serializable data; services come from the
/// [`JobContext`] at execution time. The queue runs a job exactly once.
/// Jobs that need retries implement them internally, as
/// [`SendNotificationJob`](super::SendNotificationJob) does through the
/// dispatcher.
#[async_trait]
pub trait Job: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The result type returned by this job.
    type Result: Send + 'static;

    /// Execute the job.
    ///
    /// # Errors
    ///
    /// Returns an error if the job could not produce a result.
    async fn execute(&self, ctx: &JobContext) -> JobResult<Self::Result>;

    /// Job type name for logging.
    fn job_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
