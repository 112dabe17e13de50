//! Background jobs
//!
//! A small in-process job queue built on tokio. Jobs are serializable values
//! executed against a shared [`JobContext`]; the queue bounds parallelism,
//! tracks [`JobStatus`] and supports cancellation. It never retries a job.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use greencart_notify::dispatch::{NotificationDispatcher, RecipientRef};
//! use greencart_notify::jobs::{JobContext, JobQueue, SendNotificationJob};
//!
//! # async fn example(dispatcher: NotificationDispatcher) {
//! let queue = JobQueue::new(JobContext::new().with_dispatcher(Arc::new(dispatcher)), 4);
//!
//! let handle = queue.enqueue(SendNotificationJob::welcome(RecipientRef::Id(42)));
//! println!("queued job {}", handle.id());
//!
//! let outcome = handle.wait().await;
//! # }
//! ```

mod cancellation;
mod context;
mod error;
mod job;
mod notification;
mod queue;
mod status;

pub use cancellation::CancellationToken;
pub use context::JobContext;
pub use error::{JobError, JobResult};
pub use job::{Job, JobId};
pub use notification::{enqueue_welcome_batch, SendNotificationJob};
pub use queue::{JobHandle, JobQueue};
pub use status::JobStatus;
