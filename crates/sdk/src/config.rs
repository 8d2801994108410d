//! Client configuration loaded from an optional TOML file and `CO3_*`
//! environment variables (nested keys use `__`, e.g. `CO3_PROXY__URL`).

use crate::error::SdkError;
use co3_types::HandleFormat;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "CO3";

#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST API, e.g. `https://co3.example.com/rest/`.
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub handle_format: HandleFormat,
    #[serde(default = "ClientConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    #[serde(default = "ClientConfig::default_log_level")]
    pub log_level: String,
    #[serde(default = "ClientConfig::default_log_format")]
    pub log_format: String,
}

#[derive(Clone, Deserialize)]
pub struct ProxyConfig {
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ClientConfig {
    fn default_timeout_secs() -> u64 {
        30
    }

    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_log_format() -> String {
        "pretty".to_string()
    }

    /// Configuration pointing at `api_url` with every other setting defaulted.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            handle_format: HandleFormat::default(),
            timeout_secs: Self::default_timeout_secs(),
            email: None,
            password: None,
            proxy: None,
            log_level: Self::default_log_level(),
            log_format: Self::default_log_format(),
        }
    }

    /// Load from `path` (which must exist when given) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SdkError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(SdkError::invalid_config(format!(
                    "configuration file {} not found",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Check the settings needed before opening a session.
    pub fn validate(&self) -> Result<(), SdkError> {
        if self.api_url.trim().is_empty() {
            return Err(SdkError::invalid_config("api_url must be set"));
        }
        if self.timeout_secs == 0 {
            return Err(SdkError::invalid_config("timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("handle_format", &self.handle_format)
            .field("timeout_secs", &self.timeout_secs)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("proxy", &self.proxy)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_file_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
api_url = "https://co3.example.com/rest/"
handle_format = "names"
email = "analyst@example.com"

[proxy]
url = "http://proxy.example.com:3128"
user = "svc"
"#
        )
        .unwrap();

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_url, "https://co3.example.com/rest/");
        assert_eq!(config.handle_format, HandleFormat::Names);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(
            config.proxy.as_ref().map(|p| p.url.as_str()),
            Some("http://proxy.example.com:3128")
        );
        assert_eq!(config.log_level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ClientConfig::load(Some(Path::new("/nonexistent/co3.toml"))).unwrap_err();
        assert!(matches!(err, SdkError::InvalidConfig(_)));
    }

    #[test]
    fn validate_requires_api_url() {
        let config = ClientConfig::new("  ");
        assert!(matches!(config.validate(), Err(SdkError::InvalidConfig(_))));
        assert_eq!(config.handle_format, HandleFormat::Default);
    }

    #[test]
    fn debug_redacts_passwords() {
        let mut config = ClientConfig::new("https://co3.example.com/rest/");
        config.password = Some("hunter2".into());
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
