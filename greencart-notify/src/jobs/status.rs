//! Job status tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a queued job.
///
/// The queue never retries a job, so there is no retrying state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job is queued and waiting for a worker.
    Pending,

    /// Job is currently being executed.
    Running {
        /// When the job started executing.
        started_at: DateTime<Utc>,
    },

    /// Job produced a result.
    Completed {
        /// When the job completed.
        completed_at: DateTime<Utc>,
    },

    /// Job returned an error.
    Failed {
        /// When the job failed.
        failed_at: DateTime<Utc>,
        /// Error message.
        error: String,
    },

    /// Job was cancelled.
    Cancelled {
        /// When the job was cancelled.
        cancelled_at: DateTime<Utc>,
    },
}

impl JobStatus {
    /// Check if the job is in a terminal state (completed, failed, or cancelled).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }

    /// Check if the job is currently running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Check if the job is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Short lowercase label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running { .. } => "running",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        let now = Utc::now();
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running { started_at: now }.is_terminal());
        assert!(JobStatus::Completed { completed_at: now }.is_terminal());
        assert!(JobStatus::Failed {
            failed_at: now,
            error: "boom".to_string()
        }
        .is_terminal());
        assert!(JobStatus::Cancelled { cancelled_at: now }.is_terminal());
    }

    #[test]
    fn test_labels() {
        assert_eq!(JobStatus::Pending.to_string(), "pending");
        assert!(JobStatus::Pending.is_pending());
        assert!(JobStatus::Running {
            started_at: Utc::now()
        }
        .is_running());
    }
}
