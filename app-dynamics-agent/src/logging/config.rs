use super::format::LoggingFormat;
use crate::defaults::LOG_LEVEL_ENV;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::PrettyFields;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// An enum representing possible errors during the logging initialization.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("init logging error: `{0}`")]
    TryInitError(String),
    #[error("invalid logging directive: `{0}`")]
    InvalidDirective(String),
}

/// Defines the logging configuration.
///
/// Logs are written to stderr, stdout is reserved for the output consumed by the buildpack.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub(crate) format: LoggingFormat,
    #[serde(default)]
    pub(crate) level: LogLevel,
}

impl LoggingConfig {
    /// Attempts to initialize the global logging subscriber with the inner configuration.
    pub fn try_init(&self) -> Result<(), LoggingError> {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(self.format.ansi_colors)
            .with_target(self.format.target)
            .with_env_filter(self.logging_filter()?)
            .with_timer(ChronoLocal::new(self.format.timestamp.0.clone()))
            .fmt_fields(PrettyFields::new())
            .try_init()
            .map_err(|_| {
                LoggingError::TryInitError("unable to set global logging subscriber".to_string())
            })
    }

    /// Only events of this crate are enabled by default. The `LOG_LEVEL` environment variable
    /// takes precedence over the configured level.
    fn logging_filter(&self) -> Result<EnvFilter, LoggingError> {
        let level = self.level.as_level().to_string().to_lowercase();
        let crate_directive = format!("{}={}", env!("CARGO_CRATE_NAME"), level)
            .parse::<Directive>()
            .map_err(|err| LoggingError::InvalidDirective(err.to_string()))?;

        Ok(EnvFilter::builder()
            .with_default_directive(crate_directive)
            .with_env_var(LOG_LEVEL_ENV)
            .from_env_lossy())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct LogLevel(Level);

impl LogLevel {
    fn as_level(&self) -> Level {
        self.0
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self(Level::INFO)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value_str = String::deserialize(deserializer)?;
        Level::from_str(&value_str)
            .map(LogLevel)
            .map_err(serde::de::Error::custom)
    }
}
