//! Notification jobs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Job, JobContext, JobError, JobHandle, JobQueue, JobResult};
use crate::dispatch::{DispatchOutcome, NotificationKind, RecipientRef};

/// Deferred dispatch of one notification.
///
/// The dispatcher performs all retries; the job itself runs once. A
/// `Failed` outcome is still a successful job result.
///
/// ```rust
/// use greencart_notify::dispatch::{NotificationKind, RecipientRef};
/// use greencart_notify::jobs::SendNotificationJob;
///
/// let job = SendNotificationJob::welcome(RecipientRef::Id(42));
/// let json = serde_json::to_string(&job).unwrap();
/// assert_eq!(json, r#"{"recipient":42,"kind":"welcome"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendNotificationJob {
    /// Recipient to notify.
    pub recipient: RecipientRef,
    /// Notification to send.
    pub kind: NotificationKind,
}

impl SendNotificationJob {
    /// Create a job.
    #[must_use]
    pub const fn new(recipient: RecipientRef, kind: NotificationKind) -> Self {
        Self { recipient, kind }
    }

    /// Welcome email job.
    #[must_use]
    pub const fn welcome(recipient: RecipientRef) -> Self {
        Self::new(recipient, NotificationKind::Welcome)
    }

    /// Verification reminder job.
    #[must_use]
    pub const fn verification_reminder(recipient: RecipientRef) -> Self {
        Self::new(recipient, NotificationKind::VerificationReminder)
    }
}

#[async_trait]
impl Job for SendNotificationJob {
    type Result = DispatchOutcome;

    async fn execute(&self, ctx: &JobContext) -> JobResult<Self::Result> {
        let dispatcher = ctx
            .dispatcher()
            .ok_or_else(|| JobError::ExecutionFailed("no notification dispatcher configured".to_string()))?;

        tracing::debug!(recipient = %self.recipient, kind = %self.kind, "Executing notification job");
        Ok(dispatcher.dispatch(&self.recipient, self.kind).await)
    }

    fn job_type(&self) -> &'static str {
        match self.kind {
            NotificationKind::Welcome => "send_welcome_email",
            NotificationKind::VerificationReminder => "send_verification_reminder",
        }
    }
}

/// Queue one welcome job per distinct recipient.
///
/// Returns the recipients paired with their job handles, in input order.
pub fn enqueue_welcome_batch(
    queue: &JobQueue,
    recipients: &[RecipientRef],
) -> Vec<(RecipientRef, JobHandle<DispatchOutcome>)> {
    let mut seen = HashSet::with_capacity(recipients.len());
    let handles: Vec<_> = recipients
        .iter()
        .filter(|recipient| seen.insert(*recipient))
        .map(|recipient| {
            let handle = queue.enqueue(SendNotificationJob::welcome(recipient.clone()));
            (recipient.clone(), handle)
        })
        .collect();

    tracing::info!(queued = handles.len(), "Queued welcome email jobs");
    handles
}
