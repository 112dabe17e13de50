//! Configuration management
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `GREENCART_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/greencart-notify/config.toml` (user config, XDG)
//! 4. `/etc/greencart-notify/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Environment variable format: `GREENCART_SECTION__FIELD_NAME`, for example
//! `GREENCART_EMAIL__SMTP__PASSWORD=...` or
//! `GREENCART_DISPATCH__WELCOME__MAX_RETRIES=5`.
//!
//! Unknown keys are rejected.
//!
//! # Example Configuration
//!
//! ```toml
//! [site]
//! name = "Green Cart"
//! url = "https://greencart.com"
//!
//! [email]
//! backend = "smtp"
//! from = "Green Cart <noreply@greencart.com>"
//! test_mode = false
//!
//! [email.smtp]
//! host = "smtp.gmail.com"
//! port = 587
//! username = "noreply@greencart.com"
//! use_tls = true
//! timeout_secs = 30
//!
//! [dispatch.welcome]
//! max_retries = 3
//! base_delay_secs = 60
//!
//! [dispatch.verification_reminder]
//! max_retries = 2
//! base_delay_secs = 30
//!
//! [directory]
//! path = "./recipients.json"
//!
//! [jobs]
//! workers = 4
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::directory::{InMemoryDirectory, RecipientDirectory};
use crate::dispatch::{DispatchSettings, NotificationDispatcher};
use crate::email::{ConsoleBackend, EmailSender, SiteSettings, SmtpBackend, SmtpConfig, TemplateRenderer};
use crate::error::NotifyError;
use crate::jobs::{JobContext, JobQueue};
use crate::observability::LoggingSettings;

const APP_NAME: &str = "greencart-notify";
const ENV_PREFIX: &str = "GREENCART_";

/// Semantic configuration errors found after loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is present but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which transport delivers email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackend {
    /// Deliver through SMTP.
    #[default]
    Smtp,
    /// Log emails instead of sending them.
    Console,
}

/// Email delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailSettings {
    /// Transport to use.
    pub backend: EmailBackend,

    /// Sender address.
    pub from: String,

    /// Optional reply-to address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,

    /// Prefix subjects with `[TEST] ` (default: on in debug builds).
    pub test_mode: bool,

    /// SMTP transport settings.
    pub smtp: SmtpConfig,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            backend: EmailBackend::default(),
            from: "Green Cart <noreply@greencart.com>".to_string(),
            reply_to: None,
            test_mode: cfg!(debug_assertions),
            smtp: SmtpConfig::default(),
        }
    }
}

impl EmailSettings {
    /// Build the configured transport.
    #[must_use]
    pub fn sender(&self) -> Arc<dyn EmailSender> {
        match self.backend {
            EmailBackend::Smtp => Arc::new(SmtpBackend::new(self.smtp.clone())),
            EmailBackend::Console => Arc::new(ConsoleBackend::verbose()),
        }
    }
}

/// Recipient directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectorySettings {
    /// JSON file holding the recipient records.
    pub path: PathBuf,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./recipients.json"),
        }
    }
}

/// Job queue settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobSettings {
    /// Maximum number of jobs running at once.
    pub workers: usize,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifyConfig {
    /// Public site details used in emails.
    pub site: SiteSettings,

    /// Email delivery.
    pub email: EmailSettings,

    /// Per-kind retry policies.
    pub dispatch: DispatchSettings,

    /// Recipient directory.
    pub directory: DirectorySettings,

    /// Job queue.
    pub jobs: JobSettings,

    /// Log output.
    pub logging: LoggingSettings,
}

/// Services assembled from a configuration.
#[derive(Debug, Clone)]
pub struct NotifyServices {
    /// Recipient directory.
    pub directory: Arc<InMemoryDirectory>,
    /// Dispatcher.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Job queue whose context holds the dispatcher.
    pub queue: JobQueue,
}

impl NotifyConfig {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file contains invalid TOML or unknown keys
    /// - Values fail type conversion
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        let system_config = PathBuf::from("/etc").join(APP_NAME).join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path();
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file, with environment overrides.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML, unknown keys or
    /// values of the wrong type.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use greencart_notify::config::NotifyConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = NotifyConfig::load_from("./config/production.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// The XDG user config path.
    ///
    /// ```rust
    /// use greencart_notify::config::NotifyConfig;
    ///
    /// let path = NotifyConfig::recommended_path();
    /// // ~/.config/greencart-notify/config.toml
    /// assert!(path.ends_with("config.toml"));
    /// ```
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| config_dir.join(APP_NAME).join("config.toml"),
        )
    }

    /// Check values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.site.url.starts_with("http://") || self.site.url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "site.url must be an http(s) URL, got {:?}",
                self.site.url
            )));
        }

        if self.email.from.trim().is_empty() {
            return Err(ConfigError::Invalid("email.from must not be empty".to_string()));
        }

        if self.email.backend == EmailBackend::Smtp && self.email.smtp.host.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "email.smtp.host is required for the smtp backend".to_string(),
            ));
        }

        if self.jobs.workers == 0 {
            return Err(ConfigError::Invalid("jobs.workers must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Build the email renderer.
    #[must_use]
    pub fn renderer(&self) -> TemplateRenderer {
        let renderer = TemplateRenderer::new(self.site.clone(), &self.email.from)
            .test_mode(self.email.test_mode);
        match &self.email.reply_to {
            Some(reply_to) => renderer.with_reply_to(reply_to),
            None => renderer,
        }
    }

    /// Build a dispatcher over `directory` using the configured transport.
    #[must_use]
    pub fn dispatcher(&self, directory: Arc<dyn RecipientDirectory>) -> NotificationDispatcher {
        NotificationDispatcher::new(
            directory,
            Arc::new(self.renderer()),
            self.email.sender(),
            self.dispatch,
        )
    }

    /// Validate the configuration, load the directory and assemble the
    /// dispatcher and job queue.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the directory cannot be loaded.
    pub fn build(&self) -> Result<NotifyServices, NotifyError> {
        self.validate()?;

        let directory = Arc::new(InMemoryDirectory::from_json_file(&self.directory.path)?);
        let dispatcher = Arc::new(self.dispatcher(directory.clone()));
        let queue = JobQueue::new(
            JobContext::new().with_dispatcher(Arc::clone(&dispatcher)),
            self.jobs.workers,
        );

        Ok(NotifyServices {
            directory,
            dispatcher,
            queue,
        })
    }
}
