use crate::logging::config::LoggingConfig;
use duration_str::deserialize_duration;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_NOTIFICATION_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file `{0}`: {1}")]
    Read(String, String),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Configuration file of the component.
///
/// ```yaml
/// version: 4.5.+
/// repository_root: https://download.run.pivotal.io/app-dynamics
/// default_tier_name: my-tier
/// notification:
///   timeout: 10s
///   connect_timeout: 5s
/// log:
///   level: debug
/// ```
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct FrameworkConfig {
    #[serde(flatten)]
    pub repository: RepositoryConfig,
    #[serde(flatten)]
    pub static_config: StaticConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub log: LoggingConfig,
}

impl FrameworkConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Read(path.display().to_string(), err.to_string()))?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Where the versioned agent bundle is fetched from.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RepositoryConfig {
    /// Exact version or a pattern where `+` matches any component, e.g. `4.5.+`.
    pub version: String,
    pub repository_root: Url,
}

/// Fallback values used when the service credentials do not provide them.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub default_application_name: Option<String>,
    #[serde(default)]
    pub default_tier_name: Option<String>,
    #[serde(default)]
    pub default_node_name: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct NotificationConfig {
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    #[serde(
        default = "default_connect_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub connect_timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_NOTIFICATION_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_NOTIFICATION_CONNECT_TIMEOUT
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_NOTIFICATION_TIMEOUT,
            connect_timeout: DEFAULT_NOTIFICATION_CONNECT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_minimal_config() {
        let config: FrameworkConfig = serde_yaml::from_str(
            r#"
version: 4.5.+
repository_root: https://download.run.pivotal.io/app-dynamics
"#,
        )
        .unwrap();

        assert_eq!(config.repository.version, "4.5.+");
        assert_eq!(
            config.repository.repository_root.as_str(),
            "https://download.run.pivotal.io/app-dynamics"
        );
        assert_eq!(config.static_config, StaticConfig::default());
        assert_eq!(config.notification, NotificationConfig::default());
        assert_eq!(config.log, LoggingConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config: FrameworkConfig = serde_yaml::from_str(
            r#"
version: 4.5.13_24863
repository_root: https://repo.example.com/appd
default_application_name: my-app
default_tier_name: my-tier
default_node_name: my-node
notification:
  timeout: 30s
  connect_timeout: 1m
"#,
        )
        .unwrap();

        assert_eq!(
            config.static_config,
            StaticConfig {
                default_application_name: Some("my-app".to_string()),
                default_tier_name: Some("my-tier".to_string()),
                default_node_name: Some("my-node".to_string()),
            }
        );
        assert_eq!(config.notification.timeout, Duration::from_secs(30));
        assert_eq!(config.notification.connect_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_repository() {
        let result = serde_yaml::from_str::<FrameworkConfig>("default_tier_name: tier");
        assert!(result.is_err());
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "version: 1.0.0\nrepository_root: https://repo.example.com\ndefault_node_name: node"
        )
        .unwrap();

        let config = FrameworkConfig::load(file.path()).unwrap();
        assert_eq!(config.static_config.default_node_name, Some("node".to_string()));

        assert_matches!(
            FrameworkConfig::load(Path::new("/not/existing/config.yml")),
            Err(ConfigError::Read(path, _)) => assert_eq!(path, "/not/existing/config.yml")
        );
    }
}
