//! Job cancellation.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::{JobError, JobResult};

/// A cancellation token shared between a job and the queue.
///
/// Cancelling drops the job's future at its next await point; a dispatch
/// interrupted mid-backoff records no outcome.
///
/// ```rust
/// use greencart_notify::jobs::CancellationToken;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let token = CancellationToken::new();
/// token.cancel();
///
/// let result = token
///     .run_until_cancelled(tokio::time::sleep(Duration::from_secs(60)))
///     .await;
/// assert!(result.is_err());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<CancellationState>,
}

#[derive(Debug)]
struct CancellationState {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    /// Create a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            state: Arc::new(CancellationState { tx, rx }),
        }
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.state.rx.borrow()
    }

    /// Request cancellation.
    ///
    /// Every clone of this token observes the request.
    pub fn cancel(&self) {
        let _ = self.state.tx.send(true);
        debug!("Cancellation requested");
    }

    /// Wait for the cancellation signal.
    ///
    /// Returns immediately if already cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.state.rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Run a future until it completes or the token is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `JobError::Cancelled` if cancellation wins the race.
    pub async fn run_until_cancelled<F, T>(&self, future: F) -> JobResult<T>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::select! {
            biased;
            () = self.cancelled() => Err(JobError::Cancelled),
            result = future => Ok(result),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
