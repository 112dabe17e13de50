//! Console backend for development
//!
//! Logs emails instead of sending them.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::email::{Email, EmailError, EmailSender};

/// Console email backend for development
///
/// Useful when running the dispatcher locally without SMTP credentials.
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    /// Whether to log email bodies at debug level
    verbose: bool,
}

impl ConsoleBackend {
    /// Create a new console backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verbose console backend that logs full email content
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        let from = email.from.as_ref().ok_or(EmailError::NoSender)?;
        let subject = email.subject.as_ref().ok_or(EmailError::NoSubject)?;

        info!(
            from = %from,
            to = ?email.to,
            subject = %subject,
            "Console email sent"
        );

        if self.verbose {
            debug!(
                reply_to = ?email.reply_to,
                has_html = email.html.is_some(),
                has_text = email.text.is_some(),
                "Email details"
            );

            if let Some(text) = &email.text {
                debug!(text = %text, "Email text content");
            }

            if let Some(html) = &email.html {
                debug!(html = %html, "Email HTML content");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_backend_send() {
        let backend = ConsoleBackend::new();

        let email = Email::new()
            .to("user@example.com")
            .from("noreply@greencart.com")
            .subject("Test Email")
            .text("This is a test email");

        assert!(backend.send(email).await.is_ok());
    }

    #[tokio::test]
    async fn test_console_backend_verbose() {
        let backend = ConsoleBackend::verbose();

        let email = Email::new()
            .to("user@example.com")
            .from("noreply@greencart.com")
            .subject("Test Email")
            .text("This is plain text")
            .html("<h1>This is HTML</h1>");

        assert!(backend.send(email).await.is_ok());
    }

    #[tokio::test]
    async fn test_console_backend_rejects_invalid_email() {
        let backend = ConsoleBackend::new();

        let email = Email::new().from("noreply@greencart.com").subject("Test");

        assert!(matches!(
            backend.send(email).await,
            Err(EmailError::NoRecipients)
        ));
    }
}
