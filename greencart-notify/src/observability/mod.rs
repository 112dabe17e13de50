//! Observability (logging)
//!
//! Structured logging through `tracing`. Dispatch events carry `recipient`,
//! `kind` and `attempt` fields so they can be filtered and aggregated.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty output in debug builds, JSON in release builds.
    #[default]
    Auto,
    /// Human-readable multi-line output.
    Pretty,
    /// Single-line output.
    Compact,
    /// JSON lines.
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `"info"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Output format.
    pub format: LogFormat,
}

impl LoggingSettings {
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            self.filter.as_deref().map_or_else(default_filter, EnvFilter::new)
        })
    }

    const fn resolved_format(&self) -> LogFormat {
        match self.format {
            LogFormat::Auto if cfg!(debug_assertions) => LogFormat::Pretty,
            LogFormat::Auto => LogFormat::Json,
            other => other,
        }
    }
}

fn default_filter() -> EnvFilter {
    if cfg!(debug_assertions) {
        EnvFilter::new("debug,greencart_notify=trace")
    } else {
        EnvFilter::new("info")
    }
}

/// Initialize logging with default settings
///
/// # Example
///
/// ```rust,no_run
/// use greencart_notify::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Dispatcher started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    init_with(&LoggingSettings::default())
}

/// Initialize logging
///
/// `RUST_LOG` overrides the configured filter.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_with(settings: &LoggingSettings) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(settings.env_filter());

    match settings.resolved_format() {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()?,
        LogFormat::Pretty | LogFormat::Auto => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_format_follows_build() {
        let settings = LoggingSettings::default();

        #[cfg(debug_assertions)]
        assert_eq!(settings.resolved_format(), LogFormat::Pretty);

        #[cfg(not(debug_assertions))]
        assert_eq!(settings.resolved_format(), LogFormat::Json);
    }

    #[test]
    fn test_explicit_format() {
        let settings = LoggingSettings {
            filter: Some("warn".to_string()),
            format: LogFormat::Compact,
        };
        assert_eq!(settings.resolved_format(), LogFormat::Compact);
    }

    #[test]
    fn test_format_deserialize() {
        let settings: LoggingSettings = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(settings.format, LogFormat::Json);
        assert!(settings.filter.is_none());
    }

    #[test]
    fn test_second_init_fails() {
        let settings = LoggingSettings {
            filter: Some("off".to_string()),
            format: LogFormat::Compact,
        };
        let _ = init_with(&settings);
        assert!(init_with(&settings).is_err());
    }
}
