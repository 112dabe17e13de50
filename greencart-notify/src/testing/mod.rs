//! Testing utilities
//!
//! Test doubles for the dispatcher's collaborators:
//! - [`MockEmailSender`] - records deliveries and replays scripted failures
//! - [`RecordingListener`] - captures attempt and outcome events
//! - [`FailingRenderer`] - a renderer that always fails
//! - [`fixtures`] - a small sample directory
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use greencart_notify::dispatch::{DispatchSettings, NotificationKind, RecipientRef};
//! use greencart_notify::testing::{fixtures, MockEmailSender};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sender = Arc::new(MockEmailSender::new());
//! let dispatcher = fixtures::dispatcher(sender.clone(), DispatchSettings::default());
//!
//! let outcome = dispatcher.dispatch(&RecipientRef::Id(42), NotificationKind::Welcome).await;
//! assert!(outcome.is_sent());
//! assert!(sender.was_sent_to("alice@example.com"));
//! # }
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::dispatch::{
    AttemptEvent, AttemptResult, DispatchListener, DispatchOutcome, NotificationKind, Recipient,
    RecipientRef,
};
use crate::email::{Email, EmailError, EmailSender, NotificationRenderer};

/// A failure the mock sender will return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// Transport error, eligible for retry.
    Transient,
    /// Server rejection, never retried.
    Permanent,
}

impl ScriptedFailure {
    fn into_error(self) -> EmailError {
        match self {
            Self::Transient => EmailError::smtp("421 service not available"),
            Self::Permanent => EmailError::rejected("550 mailbox unavailable"),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    sent: Vec<Email>,
    attempts: Vec<(Vec<String>, Instant)>,
    script: VecDeque<ScriptedFailure>,
    always_fail: HashSet<String>,
}

/// Mock email sender for testing
///
/// Captures delivered emails and the time of every attempt. Failures can
/// be scripted globally (`failing`, `fail_next`) or per address
/// (`always_fail_for`).
#[derive(Debug, Clone, Default)]
pub struct MockEmailSender {
    state: Arc<Mutex<MockState>>,
}

impl MockEmailSender {
    /// Create a sender that accepts every valid email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender whose first `failures` attempts fail transiently
    #[must_use]
    pub fn failing(failures: usize) -> Self {
        let sender = Self::new();
        for _ in 0..failures {
            sender.fail_next(ScriptedFailure::Transient);
        }
        sender
    }

    /// Queue a failure for the next unscripted attempt
    pub fn fail_next(&self, failure: ScriptedFailure) {
        self.state.lock().script.push_back(failure);
    }

    /// Fail every attempt addressed to `address`, transiently
    pub fn always_fail_for(&self, address: &str) {
        self.state.lock().always_fail.insert(address.to_string());
    }

    /// Number of emails delivered
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.state.lock().sent.len()
    }

    /// All delivered emails
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.state.lock().sent.clone()
    }

    /// Check if an email was delivered to a specific address
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.state
            .lock()
            .sent
            .iter()
            .any(|email| email.to.iter().any(|to| to == address))
    }

    /// Check if an email was delivered with a specific subject
    #[must_use]
    pub fn was_sent_with_subject(&self, subject: &str) -> bool {
        self.state
            .lock()
            .sent
            .iter()
            .any(|email| email.subject.as_deref() == Some(subject))
    }

    /// The last delivered email
    #[must_use]
    pub fn last_sent(&self) -> Option<Email> {
        self.state.lock().sent.last().cloned()
    }

    /// Number of delivery attempts, successful or not
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.state.lock().attempts.len()
    }

    /// Number of attempts addressed to `address`
    #[must_use]
    pub fn attempts_for(&self, address: &str) -> usize {
        self.state
            .lock()
            .attempts
            .iter()
            .filter(|(to, _)| to.iter().any(|a| a == address))
            .count()
    }

    /// When each attempt was made, in order
    #[must_use]
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.state.lock().attempts.iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        let mut state = self.state.lock();
        state.attempts.push((email.to.clone(), Instant::now()));

        if email.to.iter().any(|to| state.always_fail.contains(to)) {
            return Err(ScriptedFailure::Transient.into_error());
        }

        if let Some(failure) = state.script.pop_front() {
            return Err(failure.into_error());
        }

        email.validate()?;
        state.sent.push(email);
        Ok(())
    }
}

/// One delivery attempt seen by a [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAttempt {
    /// Recipient.
    pub recipient: RecipientRef,
    /// Kind.
    pub kind: NotificationKind,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Whether the attempt succeeded.
    pub delivered: bool,
    /// Scheduled wait before the next attempt.
    pub retry_in: Option<Duration>,
}

/// Listener that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingListener {
    attempts: Mutex<Vec<RecordedAttempt>>,
    outcomes: Mutex<Vec<(RecipientRef, NotificationKind, DispatchOutcome)>>,
}

impl RecordingListener {
    /// Create an empty listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts seen so far.
    #[must_use]
    pub fn attempts(&self) -> Vec<RecordedAttempt> {
        self.attempts.lock().clone()
    }

    /// Outcomes seen so far.
    #[must_use]
    pub fn outcomes(&self) -> Vec<(RecipientRef, NotificationKind, DispatchOutcome)> {
        self.outcomes.lock().clone()
    }
}

impl DispatchListener for RecordingListener {
    fn attempt(&self, event: &AttemptEvent<'_>) {
        let (delivered, retry_in) = match event.result {
            AttemptResult::Delivered => (true, None),
            AttemptResult::Failed { retry_in, .. } => (false, retry_in),
        };
        self.attempts.lock().push(RecordedAttempt {
            recipient: event.recipient.clone(),
            kind: event.kind,
            attempt: event.attempt,
            delivered,
            retry_in,
        });
    }

    fn outcome(&self, recipient: &RecipientRef, kind: NotificationKind, outcome: &DispatchOutcome) {
        self.outcomes
            .lock()
            .push((recipient.clone(), kind, outcome.clone()));
    }
}

/// Renderer that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRenderer;

impl NotificationRenderer for FailingRenderer {
    fn render(&self, _kind: NotificationKind, _recipient: &Recipient) -> Result<Email, EmailError> {
        Err(EmailError::TemplateError(askama::Error::Fmt(std::fmt::Error)))
    }
}

/// Sample data
pub mod fixtures {
    use std::sync::Arc;

    use crate::directory::InMemoryDirectory;
    use crate::dispatch::{DispatchSettings, NotificationDispatcher, Recipient};
    use crate::email::{EmailSender, TemplateRenderer};

    /// Directory with three recipients:
    ///
    /// | id | address             | verified | token         |
    /// |----|---------------------|----------|---------------|
    /// | 42 | `alice@example.com` | yes      |               |
    /// | 5  | `bob@example.com`   | yes      |               |
    /// | 8  | `carol@example.com` | no       | `carol-token` |
    #[must_use]
    pub fn directory() -> InMemoryDirectory {
        let directory = InMemoryDirectory::new();
        directory.insert(
            Recipient::new(42, "alice@example.com")
                .with_display_name("Alice")
                .verified(true),
        );
        directory.insert(
            Recipient::new(5, "bob@example.com")
                .with_display_name("Bob")
                .verified(true),
        );
        directory.insert(
            Recipient::new(8, "carol@example.com")
                .with_verification_token("carol-token"),
        );
        directory
    }

    /// Dispatcher over [`directory`] with the default renderer.
    #[must_use]
    pub fn dispatcher(
        sender: Arc<dyn EmailSender>,
        settings: DispatchSettings,
    ) -> NotificationDispatcher {
        NotificationDispatcher::new(
            Arc::new(directory()),
            Arc::new(TemplateRenderer::default()),
            sender,
            settings,
        )
    }
}
