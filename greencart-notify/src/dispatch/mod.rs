//! Notification dispatch
//!
//! [`NotificationDispatcher`] resolves a recipient, checks the notification's
//! precondition, renders the email and delivers it, retrying transient
//! transport failures with exponential backoff. Every dispatch ends in a
//! [`DispatchOutcome`] value.

mod dispatcher;
mod kind;
pub mod listener;
mod outcome;
mod policy;
mod recipient;

pub use dispatcher::NotificationDispatcher;
pub use kind::{NotificationKind, UnknownKind};
pub use listener::{AttemptEvent, AttemptResult, DispatchListener, TracingListener};
pub use outcome::{BulkResult, DispatchError, DispatchOutcome, SkipReason};
pub use policy::{DispatchSettings, RetryPolicy};
pub use recipient::{Recipient, RecipientRef};
