//! greencart-notify: reliable transactional email for Green Cart
//!
//! Sends welcome and email-verification-reminder notifications with bounded
//! retry and exponential backoff. The building blocks:
//!
//! - [`dispatch`]: the [`NotificationDispatcher`](dispatch::NotificationDispatcher)
//!   and its outcome model
//! - [`directory`]: where recipients are looked up
//! - [`email`]: message building, askama templates, SMTP and console transports
//! - [`jobs`]: an in-process job queue for deferred dispatch
//! - [`config`]: layered configuration with figment
//! - [`observability`]: tracing subscriber setup
//! - [`testing`]: test doubles for all of the above
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use greencart_notify::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = NotifyConfig::load()?;
//!     observability::init_with(&config.logging)?;
//!
//!     let services = config.build()?;
//!     let outcome = services
//!         .dispatcher
//!         .dispatch(&RecipientRef::Id(42), NotificationKind::Welcome)
//!         .await;
//!
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod directory;
pub mod dispatch;
pub mod email;
pub mod error;
pub mod jobs;
pub mod observability;
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use greencart_notify::prelude::*;
    //! ```

    pub use crate::config::{NotifyConfig, NotifyServices};
    pub use crate::directory::{InMemoryDirectory, RecipientDirectory};
    pub use crate::dispatch::{
        BulkResult, DispatchError, DispatchListener, DispatchOutcome, DispatchSettings,
        NotificationDispatcher, NotificationKind, Recipient, RecipientRef, RetryPolicy,
        SkipReason,
    };
    pub use crate::email::{
        ConsoleBackend, Email, EmailError, EmailSender, NotificationRenderer, SmtpBackend,
        TemplateRenderer,
    };
    pub use crate::error::NotifyError;
    pub use crate::jobs::{Job, JobError, JobId, JobQueue, JobResult, JobStatus, SendNotificationJob};
    pub use crate::observability;
}
