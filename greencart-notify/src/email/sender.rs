//! Email transport abstraction
//!
//! Every delivery backend (SMTP, console, test doubles) implements
//! [`EmailSender`]. The dispatcher only ever talks to this trait.

use async_trait::async_trait;

use super::{Email, EmailError};

/// Trait for delivering emails
///
/// Implementations report failures as [`EmailError`]; callers use
/// [`EmailError::is_transient`] to decide whether a retry is worthwhile.
///
/// ```rust
/// use greencart_notify::email::{ConsoleBackend, Email, EmailSender};
///
/// # async fn example() -> Result<(), greencart_notify::email::EmailError> {
/// let sender = ConsoleBackend::new();
///
/// let email = Email::new()
///     .to("user@example.com")
///     .from("noreply@greencart.com")
///     .subject("Hello!")
///     .text("Hello, World!");
///
/// sender.send(email).await?;
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver an email
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the email cannot be sent or is invalid
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}
