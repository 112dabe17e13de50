//! Dispatch event reporting.

use std::time::Duration;

use super::{DispatchOutcome, NotificationKind, RecipientRef};
use crate::email::EmailError;

/// How a single delivery attempt ended.
#[derive(Debug, Clone, Copy)]
pub enum AttemptResult<'a> {
    /// The transport accepted the message.
    Delivered,

    /// The transport failed.
    Failed {
        /// Transport error.
        error: &'a EmailError,
        /// Wait before the next attempt, or `None` if this was the last one.
        retry_in: Option<Duration>,
    },
}

/// One delivery attempt.
#[derive(Debug, Clone, Copy)]
pub struct AttemptEvent<'a> {
    /// Recipient being notified.
    pub recipient: &'a RecipientRef,
    /// Notification kind.
    pub kind: NotificationKind,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Attempts allowed by the retry policy.
    pub max_attempts: u32,
    /// How the attempt ended.
    pub result: AttemptResult<'a>,
}

/// Observer of dispatch progress.
///
/// Both methods default to doing nothing.
pub trait DispatchListener: Send + Sync {
    /// Called after every delivery attempt.
    fn attempt(&self, _event: &AttemptEvent<'_>) {}

    /// Called once per dispatch with its terminal outcome.
    fn outcome(&self, _recipient: &RecipientRef, _kind: NotificationKind, _outcome: &DispatchOutcome) {}
}

/// Listener that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl DispatchListener for TracingListener {
    fn attempt(&self, event: &AttemptEvent<'_>) {
        match event.result {
            AttemptResult::Delivered => tracing::debug!(
                recipient = %event.recipient,
                kind = %event.kind,
                attempt = event.attempt,
                "delivery attempt succeeded"
            ),
            AttemptResult::Failed {
                error,
                retry_in: Some(delay),
            } => tracing::warn!(
                recipient = %event.recipient,
                kind = %event.kind,
                attempt = event.attempt,
                max_attempts = event.max_attempts,
                retry_in_secs = delay.as_secs(),
                error = %error,
                "delivery attempt failed, retrying"
            ),
            AttemptResult::Failed {
                error,
                retry_in: None,
            } => tracing::error!(
                recipient = %event.recipient,
                kind = %event.kind,
                attempt = event.attempt,
                transient = error.is_transient(),
                error = %error,
                "delivery attempt failed, giving up"
            ),
        }
    }

    fn outcome(&self, recipient: &RecipientRef, kind: NotificationKind, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Sent { attempts } => {
                tracing::info!(recipient = %recipient, kind = %kind, attempts, "notification sent");
            }
            DispatchOutcome::Skipped { reason } => {
                tracing::info!(recipient = %recipient, kind = %kind, %reason, "notification skipped");
            }
            DispatchOutcome::Failed {
                error,
                attempts_made,
            } => {
                tracing::error!(
                    recipient = %recipient,
                    kind = %kind,
                    attempts = attempts_made,
                    error = %error,
                    "notification failed"
                );
            }
        }
    }
}
