//! Email building, rendering and delivery
//!
//! This module provides:
//! - [`Email`], a fluent message builder
//! - [`EmailSender`], the transport trait, with SMTP and console backends
//! - askama templates for the welcome and verification-reminder emails
//! - [`NotificationRenderer`], which turns a notification kind and a
//!   recipient into a complete email
//!
//! # Examples
//!
//! ```rust,no_run
//! use greencart_notify::email::{Email, EmailSender, SmtpBackend, SmtpConfig};
//!
//! # async fn example() -> Result<(), greencart_notify::email::EmailError> {
//! let backend = SmtpBackend::new(SmtpConfig {
//!     username: "noreply@greencart.com".to_string(),
//!     password: "app-password".to_string(),
//!     ..SmtpConfig::default()
//! });
//!
//! let email = Email::new()
//!     .to("user@example.com")
//!     .from("Green Cart <noreply@greencart.com>")
//!     .subject("Welcome!")
//!     .text("Welcome to Green Cart!");
//!
//! backend.send(email).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod builder;
mod error;
mod notification;
pub mod sender;
mod template;

pub use backend::console::ConsoleBackend;
pub use backend::smtp::{SmtpBackend, SmtpConfig};
pub use builder::Email;
pub use error::EmailError;
pub use notification::{NotificationRenderer, SiteSettings, TemplateRenderer};
#[cfg(test)]
pub use notification::MockNotificationRenderer;
pub use sender::EmailSender;
pub use template::{EmailTemplate, VerificationReminderEmail, WelcomeEmail};
