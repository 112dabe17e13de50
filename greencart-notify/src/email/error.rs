//! Email error types

use thiserror::Error;

/// Errors that can occur when building, rendering or sending emails
#[derive(Debug, Error)]
pub enum EmailError {
    /// Email has no recipients
    #[error("email must have at least one recipient")]
    NoRecipients,

    /// Email has no sender
    #[error("email must have a from address")]
    NoSender,

    /// Email has no subject
    #[error("email must have a subject")]
    NoSubject,

    /// Email has no body content
    #[error("email must have either text or HTML content")]
    NoContent,

    /// Invalid email address format
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error
    #[error("failed to render email template: {0}")]
    TemplateError(#[from] askama::Error),

    /// The message could not be assembled by the transport
    #[error("failed to build message: {0}")]
    MessageError(String),

    /// SMTP transport error
    #[error("SMTP error: {0}")]
    SmtpError(String),

    /// The server refused the message with a permanent (5xx) reply
    #[error("message rejected by server: {0}")]
    Rejected(String),

    /// Email configuration error
    #[error("email configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EmailError {
    /// Create an SMTP error from a string message
    #[must_use]
    pub fn smtp<T: Into<String>>(msg: T) -> Self {
        Self::SmtpError(msg.into())
    }

    /// Create a permanent rejection error from a string message
    #[must_use]
    pub fn rejected<T: Into<String>>(msg: T) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a message building error from a string message
    #[must_use]
    pub fn message<T: Into<String>>(msg: T) -> Self {
        Self::MessageError(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether retrying the same send could plausibly succeed.
    ///
    /// Transport and I/O failures (connection refused, timeouts, temporary
    /// SMTP rejections) are transient. Everything that depends only on the
    /// message itself is permanent.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::SmtpError(_) | Self::IoError(_))
    }
}
