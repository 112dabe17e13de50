//! Email templates
//!
//! Askama templates for the notification emails, each rendered as an HTML
//! body plus a plain text alternative. Template sources live under
//! `templates/emails/`.

use askama::Template;

use super::EmailError;

/// Trait for email templates
///
/// Returns `(html, text)`; either can be `None`.
pub trait EmailTemplate {
    /// Render the email template
    ///
    /// # Errors
    ///
    /// Returns `EmailError::TemplateError` if the template fails to render
    fn render_email(&self) -> Result<(Option<String>, Option<String>), EmailError>;
}

/// Welcome email sent once a user has verified their address
#[derive(Template)]
#[template(path = "emails/welcome.html")]
pub struct WelcomeEmail<'a> {
    /// Name used in the greeting
    pub first_name: &'a str,
    /// Public name of the shop
    pub site_name: &'a str,
    /// Landing page linked from the email
    pub site_url: &'a str,
    /// Subject line, repeated in the document title
    pub subject: &'a str,
}

#[derive(Template)]
#[template(path = "emails/welcome.txt")]
struct WelcomeEmailText<'a> {
    first_name: &'a str,
    site_name: &'a str,
    site_url: &'a str,
}

impl EmailTemplate for WelcomeEmail<'_> {
    fn render_email(&self) -> Result<(Option<String>, Option<String>), EmailError> {
        let html = self.render()?;
        let text = WelcomeEmailText {
            first_name: self.first_name,
            site_name: self.site_name,
            site_url: self.site_url,
        }
        .render()?;
        Ok((Some(html), Some(text)))
    }
}

/// Reminder for users who registered but never verified their address
#[derive(Template)]
#[template(path = "emails/verification_reminder.html")]
pub struct VerificationReminderEmail<'a> {
    /// Name used in the greeting
    pub first_name: &'a str,
    /// Public name of the shop
    pub site_name: &'a str,
    /// Verification link, when the user still has a pending token
    pub verification_link: Option<&'a str>,
    /// Subject line, repeated in the document title
    pub subject: &'a str,
}

#[derive(Template)]
#[template(path = "emails/verification_reminder.txt")]
struct VerificationReminderEmailText<'a> {
    first_name: &'a str,
    site_name: &'a str,
    verification_link: Option<&'a str>,
}

impl EmailTemplate for VerificationReminderEmail<'_> {
    fn render_email(&self) -> Result<(Option<String>, Option<String>), EmailError> {
        let html = self.render()?;
        let text = VerificationReminderEmailText {
            first_name: self.first_name,
            site_name: self.site_name,
            verification_link: self.verification_link,
        }
        .render()?;
        Ok((Some(html), Some(text)))
    }
}
