//! Email builder with fluent API

use serde::{Deserialize, Serialize};

use super::{EmailError, EmailTemplate};

/// An email message
///
/// ```rust
/// use greencart_notify::email::Email;
///
/// let email = Email::new()
///     .to("user@example.com")
///     .from("Green Cart <noreply@greencart.com>")
///     .subject("Welcome!")
///     .text("Welcome to Green Cart!")
///     .html("<h1>Welcome to Green Cart!</h1>");
///
/// assert!(email.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Email recipients (To)
    pub to: Vec<String>,

    /// Email sender (From)
    pub from: Option<String>,

    /// Reply-To address
    pub reply_to: Option<String>,

    /// Email subject
    pub subject: Option<String>,

    /// Plain text body
    pub text: Option<String>,

    /// HTML body
    pub html: Option<String>,
}

impl Email {
    /// Create a new empty email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an email whose bodies come from a rendered template
    ///
    /// # Errors
    ///
    /// Returns `EmailError::TemplateError` if the template fails to render
    pub fn from_template<T: EmailTemplate>(template: &T) -> Result<Self, EmailError> {
        let (html, text) = template.render_email()?;

        let mut email = Self::new();
        if let Some(html_content) = html {
            email = email.html(&html_content);
        }
        if let Some(text_content) = text {
            email = email.text(&text_content);
        }

        Ok(email)
    }

    /// Add a recipient (To)
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to.push(address.to_string());
        self
    }

    /// Set the sender (From)
    #[must_use]
    pub fn from(mut self, address: &str) -> Self {
        self.from = Some(address.to_string());
        self
    }

    /// Set the reply-to address
    #[must_use]
    pub fn reply_to(mut self, address: &str) -> Self {
        self.reply_to = Some(address.to_string());
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the plain text body
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Set the HTML body
    #[must_use]
    pub fn html(mut self, html: &str) -> Self {
        self.html = Some(html.to_string());
        self
    }

    /// Check that the email carries everything a transport needs
    ///
    /// Recipient addresses get a shallow `local@domain` check; full syntax
    /// validation is left to the transport.
    ///
    /// # Errors
    ///
    /// Returns the first missing piece as an `EmailError`
    pub fn validate(&self) -> Result<(), EmailError> {
        if self.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        if let Some(bad) = self.to.iter().find(|addr| !looks_like_address(addr)) {
            return Err(EmailError::InvalidAddress(bad.clone()));
        }

        if self.from.is_none() {
            return Err(EmailError::NoSender);
        }

        if self.subject.is_none() {
            return Err(EmailError::NoSubject);
        }

        if self.text.is_none() && self.html.is_none() {
            return Err(EmailError::NoContent);
        }

        Ok(())
    }
}

fn looks_like_address(addr: &str) -> bool {
    addr.trim()
        .rsplit_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}
