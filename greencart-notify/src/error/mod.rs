//! Error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::directory::DirectoryError;
use crate::email::EmailError;
use crate::jobs::JobError;

/// Errors raised while setting up or driving the notification service.
///
/// Dispatch itself never fails with this type: its results are
/// [`DispatchOutcome`](crate::dispatch::DispatchOutcome) values.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Recipient directory error
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Email error
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Job error
    #[error("Job error: {0}")]
    Job(#[from] JobError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: NotifyError = ConfigError::Invalid("jobs.workers must be at least 1".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid configuration: jobs.workers must be at least 1"
        );

        let err: NotifyError = JobError::Cancelled.into();
        assert!(matches!(err, NotifyError::Job(JobError::Cancelled)));
    }
}
