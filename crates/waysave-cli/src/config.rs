//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use waysave_spn::Credentials;

/// Global configuration for waysave
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub http: HttpSection,
    pub save: SaveSection,
    pub check: CheckSection,
    pub available: AvailableSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    #[serde(deserialize_with = "deserialize_env_var")]
    pub access_key: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub secret: Option<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            access_key: std::env::var("IAACCESS").ok(),
            secret: std::env::var("IASECRET").ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub max_retries: u32,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self { max_retries: 5 }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SaveSection {
    pub delay_secs: u64,
    pub retry_interval_secs: u64,
}

impl Default for SaveSection {
    fn default() -> Self {
        Self {
            delay_secs: 10,
            retry_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CheckSection {
    pub poll_interval_secs: u64,
}

impl Default for CheckSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AvailableSection {
    pub delay_secs: u64,
}

impl Default for AvailableSection {
    fn default() -> Self {
        Self { delay_secs: 10 }
    }
}

/// Deserialize a string that may contain an environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./waysave.toml (current directory)
    /// 2. ~/.config/waysave/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("waysave.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "waysave") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve API credentials, failing with a hint if unset.
    pub fn credentials(&self) -> Result<Credentials> {
        let access_key = self
            .credentials
            .access_key
            .clone()
            .context("No access key: set IAACCESS or [credentials] access_key")?;
        let secret = self
            .credentials
            .secret
            .clone()
            .context("No secret key: set IASECRET or [credentials] secret")?;
        Ok(Credentials { access_key, secret })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sections() {
        let config = Config::default();
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.save.delay_secs, 10);
        assert_eq!(config.save.retry_interval_secs, 300);
        assert_eq!(config.check.poll_interval_secs, 30);
        assert_eq!(config.available.delay_secs, 10);
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("WAYSAVE_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${WAYSAVE_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("WAYSAVE_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[credentials]
access_key = "ak"
secret = "sk"

[save]
delay_secs = 5
retry_interval_secs = 60

[http]
max_retries = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.credentials.access_key.as_deref(), Some("ak"));
        assert_eq!(config.save.delay_secs, 5);
        assert_eq!(config.save.retry_interval_secs, 60);
        assert_eq!(config.http.max_retries, 3);
        // Unlisted sections keep defaults
        assert_eq!(config.check.poll_interval_secs, 30);
    }

    #[test]
    fn credentials_default_from_env() {
        std::env::set_var("IAACCESS", "env-ak");
        std::env::set_var("IASECRET", "env-sk");
        let creds = Config::default().credentials().unwrap();
        assert_eq!(creds.authorization(), "LOW env-ak:env-sk");
        std::env::remove_var("IAACCESS");
        std::env::remove_var("IASECRET");
    }

    #[test]
    fn credentials_missing_is_error() {
        let config = Config {
            credentials: CredentialsConfig {
                access_key: None,
                secret: None,
            },
            ..Config::default()
        };
        let err = config.credentials().unwrap_err();
        assert!(format!("{err:#}").contains("IAACCESS"));
    }

    #[test]
    fn credentials_from_literal_config() {
        let config: Config = toml::from_str(
            r#"
[credentials]
access_key = "ak"
secret = "sk"
"#,
        )
        .unwrap();
        let creds = config.credentials().unwrap();
        assert_eq!(creds.authorization(), "LOW ak:sk");
    }
}
