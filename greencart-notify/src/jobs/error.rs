//! Job-related error types.

use thiserror::Error;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Errors that can occur during job processing.
///
/// A failed [`DispatchOutcome`](crate::dispatch::DispatchOutcome) is a
/// successful job result, not a `JobError`: these errors mean the job
/// produced no outcome at all.
#[derive(Debug, Error)]
pub enum JobError {
    /// Job execution failed.
    #[error("job execution failed: {0}")]
    ExecutionFailed(String),

    /// Job was cancelled before it finished.
    #[error("job was cancelled")]
    Cancelled,

    /// Job panicked.
    #[error("job panicked: {0}")]
    Panicked(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Job not found.
    #[error("job not found: {0}")]
    NotFound(String),
}

impl From<String> for JobError {
    fn from(s: String) -> Self {
        Self::ExecutionFailed(s)
    }
}

impl From<&str> for JobError {
    fn from(s: &str) -> Self {
        Self::ExecutionFailed(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let err: JobError = "no dispatcher".into();
        assert!(matches!(err, JobError::ExecutionFailed(ref msg) if msg == "no dispatcher"));
        assert_eq!(err.to_string(), "job execution failed: no dispatcher");
    }

    #[test]
    fn test_cancelled_display() {
        assert_eq!(JobError::Cancelled.to_string(), "job was cancelled");
    }
}
