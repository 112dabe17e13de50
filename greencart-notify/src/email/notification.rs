//! Rendering notifications into emails.

use serde::{Deserialize, Serialize};

use super::template::{VerificationReminderEmail, WelcomeEmail};
use super::{Email, EmailError};
use crate::dispatch::{NotificationKind, Recipient};

/// Turns a notification kind and recipient into a ready-to-send [`Email`].
#[cfg_attr(test, mockall::automock)]
pub trait NotificationRenderer: Send + Sync {
    /// Render the email for `kind` addressed to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the template fails to render or the resulting
    /// email is incomplete.
    fn render(&self, kind: NotificationKind, recipient: &Recipient) -> Result<Email, EmailError>;
}

/// Public site details shown in emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettings {
    /// Shop name.
    pub name: String,
    /// Frontend base URL; verification links are built from it.
    pub url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: "Green Cart".to_string(),
            url: "https://greencart.com".to_string(),
        }
    }
}

impl SiteSettings {
    /// Verification link for `token`.
    #[must_use]
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={token}", self.url.trim_end_matches('/'))
    }
}

/// Renders the bundled askama templates.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    site: SiteSettings,
    from: String,
    reply_to: Option<String>,
    test_mode: bool,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(SiteSettings::default(), "Green Cart <noreply@greencart.com>")
    }
}

impl TemplateRenderer {
    /// Create a renderer sending from `from`.
    #[must_use]
    pub fn new(site: SiteSettings, from: &str) -> Self {
        Self {
            site,
            from: from.to_string(),
            reply_to: None,
            test_mode: false,
        }
    }

    /// Set the reply-to address.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: &str) -> Self {
        self.reply_to = Some(reply_to.to_string());
        self
    }

    /// Prefix subjects with `[TEST] ` so non-production mail is recognisable.
    #[must_use]
    pub const fn test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    /// Site settings in use.
    #[must_use]
    pub const fn site(&self) -> &SiteSettings {
        &self.site
    }

    fn subject(&self, kind: NotificationKind) -> String {
        if self.test_mode {
            format!("[TEST] {}", kind.subject())
        } else {
            kind.subject().to_string()
        }
    }
}

impl NotificationRenderer for TemplateRenderer {
    fn render(&self, kind: NotificationKind, recipient: &Recipient) -> Result<Email, EmailError> {
        let subject = self.subject(kind);
        let first_name = recipient.greeting_name();

        let email = match kind {
            NotificationKind::Welcome => Email::from_template(&WelcomeEmail {
                first_name,
                site_name: &self.site.name,
                site_url: &self.site.url,
                subject: &subject,
            })?,
            NotificationKind::VerificationReminder => {
                let link = recipient
                    .verification_token
                    .as_deref()
                    .map(|token| self.site.verification_link(token));
                Email::from_template(&VerificationReminderEmail {
                    first_name,
                    site_name: &self.site.name,
                    verification_link: link.as_deref(),
                    subject: &subject,
                })?
            }
        };

        let mut email = email
            .to(&recipient.address)
            .from(&self.from)
            .subject(&subject);
        if let Some(reply_to) = &self.reply_to {
            email = email.reply_to(reply_to);
        }

        email.validate()?;
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_email() {
        let recipient = Recipient::new(42, "jane@example.com")
            .with_display_name("Jane")
            .verified(true);

        let email = TemplateRenderer::default()
            .render(NotificationKind::Welcome, &recipient)
            .unwrap();

        assert_eq!(email.to, vec!["jane@example.com".to_string()]);
        assert_eq!(email.from.as_deref(), Some("Green Cart <noreply@greencart.com>"));
        assert_eq!(email.subject.as_deref(), Some(NotificationKind::Welcome.subject()));
        assert!(email.text.unwrap().contains("Jane"));
        assert!(email.html.is_some());
    }

    #[test]
    fn test_reminder_includes_verification_link() {
        let recipient = Recipient::new(7, "sam@example.com").with_verification_token("tok123");
        let renderer = TemplateRenderer::new(
            SiteSettings {
                name: "Green Cart".to_string(),
                url: "https://shop.test/".to_string(),
            },
            "noreply@shop.test",
        );

        let email = renderer
            .render(NotificationKind::VerificationReminder, &recipient)
            .unwrap();

        assert!(email
            .text
            .unwrap()
            .contains("https://shop.test/verify-email?token=tok123"));
    }

    #[test]
    fn test_test_mode_prefixes_subject() {
        let recipient = Recipient::new(1, "a@example.com").verified(true);
        let renderer = TemplateRenderer::default().test_mode(true);

        let email = renderer.render(NotificationKind::Welcome, &recipient).unwrap();
        assert!(email.subject.unwrap().starts_with("[TEST] Welcome to Green Cart"));
    }

    #[test]
    fn test_reply_to() {
        let recipient = Recipient::new(1, "a@example.com").verified(true);
        let renderer = TemplateRenderer::default().with_reply_to("support@greencart.com");

        let email = renderer.render(NotificationKind::Welcome, &recipient).unwrap();
        assert_eq!(email.reply_to.as_deref(), Some("support@greencart.com"));
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let recipient = Recipient::new(1, "not-an-address").verified(true);

        let result = TemplateRenderer::default().render(NotificationKind::Welcome, &recipient);
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }
}
