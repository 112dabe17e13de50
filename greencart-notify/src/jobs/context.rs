//! Job execution context.

use std::fmt;
use std::sync::Arc;

use crate::dispatch::NotificationDispatcher;

/// Services available to jobs at execution time.
///
/// Stored once in the [`JobQueue`](super::JobQueue) and shared with every job
/// through an `Arc`, so jobs themselves stay serializable.
#[derive(Clone, Default)]
pub struct JobContext {
    dispatcher: Option<Arc<NotificationDispatcher>>,
}

impl JobContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a notification dispatcher.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<NotificationDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// The notification dispatcher, if configured.
    #[must_use]
    pub fn dispatcher(&self) -> Option<&Arc<NotificationDispatcher>> {
        self.dispatcher.as_ref()
    }
}

impl fmt::Debug for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobContext")
            .field("dispatcher", &self.dispatcher.is_some())
            .finish()
    }
}
