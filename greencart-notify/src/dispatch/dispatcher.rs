//! The notification dispatcher.

use futures_util::future::join_all;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::listener::{AttemptEvent, AttemptResult, DispatchListener, TracingListener};
use super::{
    BulkResult, DispatchError, DispatchOutcome, DispatchSettings, NotificationKind, RecipientRef,
    RetryPolicy, SkipReason,
};
use crate::directory::RecipientDirectory;
use crate::email::{Email, EmailSender, NotificationRenderer};

/// Sends one notification to one recipient with bounded retry.
///
/// Every collaborator is injected, so the dispatcher holds no global state
/// and can be shared freely behind an `Arc`.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use greencart_notify::directory::InMemoryDirectory;
/// use greencart_notify::dispatch::{DispatchSettings, NotificationDispatcher, NotificationKind, Recipient, RecipientRef};
/// use greencart_notify::email::{ConsoleBackend, TemplateRenderer};
///
/// # async fn example() {
/// let directory = InMemoryDirectory::new();
/// directory.insert(Recipient::new(42, "jane@example.com").verified(true));
///
/// let dispatcher = NotificationDispatcher::new(
///     Arc::new(directory),
///     Arc::new(TemplateRenderer::default()),
///     Arc::new(ConsoleBackend::new()),
///     DispatchSettings::default(),
/// );
///
/// let outcome = dispatcher.dispatch(&RecipientRef::Id(42), NotificationKind::Welcome).await;
/// assert!(outcome.is_sent());
/// # }
/// ```
#[derive(Clone)]
pub struct NotificationDispatcher {
    directory: Arc<dyn RecipientDirectory>,
    renderer: Arc<dyn NotificationRenderer>,
    sender: Arc<dyn EmailSender>,
    settings: DispatchSettings,
    listener: Arc<dyn DispatchListener>,
}

impl NotificationDispatcher {
    /// Create a dispatcher that reports progress through `tracing`.
    #[must_use]
    pub fn new(
        directory: Arc<dyn RecipientDirectory>,
        renderer: Arc<dyn NotificationRenderer>,
        sender: Arc<dyn EmailSender>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            directory,
            renderer,
            sender,
            settings,
            listener: Arc::new(TracingListener),
        }
    }

    /// Replace the progress listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn DispatchListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Retry settings in effect.
    #[must_use]
    pub const fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Dispatch a notification of `kind` to `recipient`.
    ///
    /// Never fails: every way the dispatch can end is a [`DispatchOutcome`].
    /// Calling this twice for the same recipient sends twice.
    pub async fn dispatch(&self, recipient: &RecipientRef, kind: NotificationKind) -> DispatchOutcome {
        let outcome = self.run(recipient, kind).await;
        self.listener.outcome(recipient, kind, &outcome);
        outcome
    }

    /// Dispatch welcome emails to every recipient concurrently.
    pub async fn dispatch_bulk(&self, recipients: &[RecipientRef]) -> BulkResult {
        self.dispatch_bulk_with_kind(recipients, NotificationKind::Welcome)
            .await
    }

    /// Dispatch `kind` to every recipient concurrently.
    ///
    /// Duplicate refs are dispatched once and reported at their first
    /// position. One recipient's failure never affects another.
    pub async fn dispatch_bulk_with_kind(
        &self,
        recipients: &[RecipientRef],
        kind: NotificationKind,
    ) -> BulkResult {
        let mut seen = HashSet::with_capacity(recipients.len());
        let unique: Vec<&RecipientRef> = recipients
            .iter()
            .filter(|recipient| seen.insert(*recipient))
            .collect();

        tracing::debug!(count = unique.len(), kind = %kind, "starting bulk dispatch");

        let outcomes = join_all(unique.iter().map(|recipient| self.dispatch(recipient, kind))).await;

        BulkResult::from_entries(unique.into_iter().cloned().zip(outcomes).collect())
    }

    async fn run(&self, recipient_ref: &RecipientRef, kind: NotificationKind) -> DispatchOutcome {
        let Some(recipient) = self.directory.resolve(recipient_ref).await else {
            return DispatchOutcome::not_found();
        };

        if !kind.precondition_met(&recipient) {
            return DispatchOutcome::Skipped {
                reason: SkipReason::PreconditionUnmet,
            };
        }

        let email = match self.renderer.render(kind, &recipient) {
            Ok(email) => email,
            Err(e) => {
                return DispatchOutcome::Failed {
                    error: DispatchError::Render(e.to_string()),
                    attempts_made: 0,
                }
            }
        };

        self.deliver(recipient_ref, kind, &email, self.settings.policy_for(kind))
            .await
    }

    async fn deliver(
        &self,
        recipient: &RecipientRef,
        kind: NotificationKind,
        email: &Email,
        policy: RetryPolicy,
    ) -> DispatchOutcome {
        let max_attempts = policy.max_attempts();
        let mut attempt = 1;

        loop {
            match self.sender.send(email.clone()).await {
                Ok(()) => {
                    self.listener.attempt(&AttemptEvent {
                        recipient,
                        kind,
                        attempt,
                        max_attempts,
                        result: AttemptResult::Delivered,
                    });
                    return DispatchOutcome::Sent { attempts: attempt };
                }
                Err(e) => {
                    let retry_in = (e.is_transient() && attempt < max_attempts)
                        .then(|| policy.delay_for(attempt - 1));

                    self.listener.attempt(&AttemptEvent {
                        recipient,
                        kind,
                        attempt,
                        max_attempts,
                        result: AttemptResult::Failed {
                            error: &e,
                            retry_in,
                        },
                    });

                    let Some(delay) = retry_in else {
                        return DispatchOutcome::Failed {
                            error: DispatchError::Delivery(e.to_string()),
                            attempts_made: attempt,
                        };
                    };

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryDirectory, MockRecipientDirectory};
    use crate::dispatch::Recipient;
    use crate::email::sender::MockEmailSender as AutoMockSender;
    use crate::email::{EmailError, MockNotificationRenderer, TemplateRenderer};
    use crate::testing::{FailingRenderer, MockEmailSender, RecordingListener};
    use std::time::Duration;
    use tokio::time::Instant;

    fn directory() -> Arc<InMemoryDirectory> {
        let directory = InMemoryDirectory::new();
        directory.insert(
            Recipient::new(42, "verified@example.com")
                .with_display_name("Vera")
                .verified(true),
        );
        directory.insert(
            Recipient::new(5, "pending@example.com")
                .verified(false)
                .with_verification_token("tok-5"),
        );
        Arc::new(directory)
    }

    fn dispatcher(sender: Arc<dyn EmailSender>, settings: DispatchSettings) -> NotificationDispatcher {
        NotificationDispatcher::new(
            directory(),
            Arc::new(TemplateRenderer::default()),
            sender,
            settings,
        )
    }

    #[tokio::test]
    async fn test_welcome_is_sent_once() {
        let sender = Arc::new(MockEmailSender::new());
        let dispatcher = dispatcher(sender.clone(), DispatchSettings::default());

        let outcome = dispatcher
            .dispatch(&RecipientRef::Id(42), NotificationKind::Welcome)
            .await;

        assert_eq!(outcome, DispatchOutcome::Sent { attempts: 1 });
        assert_eq!(sender.sent_count(), 1);
        assert!(sender.was_sent_to("verified@example.com"));
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_not_retried() {
        let mut mock = AutoMockSender::new();
        mock.expect_send().never();
        let dispatcher = dispatcher(Arc::new(mock), DispatchSettings::default());

        let outcome = dispatcher
            .dispatch(&RecipientRef::Id(999), NotificationKind::Welcome)
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                error: DispatchError::RecipientNotFound,
                attempts_made: 0
            }
        );
    }

    #[tokio::test]
    async fn test_precondition_skips_delivery() {
        let mut mock = AutoMockSender::new();
        mock.expect_send().never();
        let dispatcher = dispatcher(Arc::new(mock), DispatchSettings::default());

        let welcome = dispatcher
            .dispatch(&RecipientRef::Id(5), NotificationKind::Welcome)
            .await;
        let reminder = dispatcher
            .dispatch(&RecipientRef::Id(42), NotificationKind::VerificationReminder)
            .await;

        for outcome in [welcome, reminder] {
            assert_eq!(
                outcome,
                DispatchOutcome::Skipped {
                    reason: SkipReason::PreconditionUnmet
                }
            );
        }
    }

    #[tokio::test]
    async fn test_render_failure_is_not_retried() {
        let sender = Arc::new(MockEmailSender::new());
        let dispatcher = NotificationDispatcher::new(
            directory(),
            Arc::new(FailingRenderer),
            sender.clone(),
            DispatchSettings::default(),
        );

        let outcome = dispatcher
            .dispatch(&RecipientRef::Id(42), NotificationKind::Welcome)
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Failed {
                error: DispatchError::Render(_),
                attempts_made: 0
            }
        ));
        assert_eq!(sender.attempt_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried_with_backoff() {
        let sender = Arc::new(MockEmailSender::failing(2));
        let dispatcher = dispatcher(
            sender.clone(),
            DispatchSettings::uniform(RetryPolicy::new(3, 10)),
        );

        let outcome = dispatcher
            .dispatch(&RecipientRef::Id(42), NotificationKind::Welcome)
            .await;

        assert_eq!(outcome, DispatchOutcome::Sent { attempts: 3 });

        let times = sender.attempt_times();
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_secs(10));
        assert_eq!(times[2] - times[1], Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries() {
        let sender = Arc::new(MockEmailSender::failing(10));
        let dispatcher = dispatcher(
            sender.clone(),
            DispatchSettings::uniform(RetryPolicy::new(2, 1)),
        );
        let start = Instant::now();

        let outcome = dispatcher
            .dispatch(&RecipientRef::Id(42), NotificationKind::Welcome)
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Failed {
                error: DispatchError::Delivery(_),
                attempts_made: 3
            }
        ));
        assert_eq!(sender.attempt_count(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(1 + 2));
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_immediately() {
        let mut mock = AutoMockSender::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Err(EmailError::rejected("550 mailbox unavailable")));
        let dispatcher = dispatcher(Arc::new(mock), DispatchSettings::default());

        let outcome = dispatcher
            .dispatch(&RecipientRef::Id(42), NotificationKind::Welcome)
            .await;

        assert_eq!(outcome.attempts(), 1);
        assert!(outcome.is_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_sees_every_attempt_and_outcome() {
        let sender = Arc::new(MockEmailSender::failing(1));
        let listener = Arc::new(RecordingListener::new());
        let dispatcher = dispatcher(sender, DispatchSettings::uniform(RetryPolicy::new(1, 5)))
            .with_listener(listener.clone());

        dispatcher
            .dispatch(&RecipientRef::Id(42), NotificationKind::Welcome)
            .await;

        let attempts = listener.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].attempt, 1);
        assert_eq!(attempts[0].retry_in, Some(Duration::from_secs(5)));
        assert!(!attempts[0].delivered);
        assert!(attempts[1].delivered);

        let outcomes = listener.outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].2, DispatchOutcome::Sent { attempts: 2 });
    }

    #[tokio::test]
    async fn test_recipient_is_resolved_on_every_call() {
        let mut directory = MockRecipientDirectory::new();
        directory
            .expect_resolve()
            .times(2)
            .returning(|_| Some(Recipient::new(42, "verified@example.com").verified(true)));

        let mut renderer = MockNotificationRenderer::new();
        renderer
            .expect_render()
            .withf(|kind, recipient| {
                *kind == NotificationKind::Welcome && recipient.address == "verified@example.com"
            })
            .times(2)
            .returning(|_, recipient| {
                Ok(Email::new()
                    .to(&recipient.address)
                    .from("noreply@greencart.com")
                    .subject("Welcome")
                    .text("Hello"))
            });

        let sender = Arc::new(MockEmailSender::new());
        let dispatcher = NotificationDispatcher::new(
            Arc::new(directory),
            Arc::new(renderer),
            sender.clone(),
            DispatchSettings::default(),
        );

        for _ in 0..2 {
            let outcome = dispatcher
                .dispatch(&RecipientRef::Id(42), NotificationKind::Welcome)
                .await;
            assert!(outcome.is_sent());
        }
        assert_eq!(sender.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_bulk_collapses_duplicates() {
        let sender = Arc::new(MockEmailSender::new());
        let dispatcher = dispatcher(sender.clone(), DispatchSettings::default());

        let result = dispatcher
            .dispatch_bulk(&[
                RecipientRef::Id(42),
                RecipientRef::Id(7),
                RecipientRef::Id(42),
            ])
            .await;

        assert_eq!(result.len(), 2);
        assert_eq!(sender.sent_count(), 1);
        let order: Vec<_> = result.recipients().cloned().collect();
        assert_eq!(order, vec![RecipientRef::Id(42), RecipientRef::Id(7)]);
    }

    #[tokio::test]
    async fn test_bulk_reminders() {
        let sender = Arc::new(MockEmailSender::new());
        let dispatcher = dispatcher(sender.clone(), DispatchSettings::default());

        let result = dispatcher
            .dispatch_bulk_with_kind(
                &[RecipientRef::Id(42), RecipientRef::Id(5)],
                NotificationKind::VerificationReminder,
            )
            .await;

        assert!(result.get(&RecipientRef::Id(42)).unwrap().is_skipped());
        assert!(result.get(&RecipientRef::Id(5)).unwrap().is_sent());
        assert!(sender.was_sent_to("pending@example.com"));
    }
}
