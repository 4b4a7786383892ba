use std::time::Duration;

use okta_client::{ClientConfig, MAX_RETRIES_CEILING, RetryPolicy};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Okta organization, the `acme` in `acme.okta.com`.
    #[serde(default)]
    pub org_name: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Full API root; takes precedence over `org_name` and `base_url`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_min_backoff_secs")]
    pub min_backoff_secs: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("org_name", &self.org_name)
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("endpoint", &self.endpoint)
            .field("parallelism", &self.parallelism)
            .field("max_retries", &self.max_retries)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("min_backoff_secs", &self.min_backoff_secs)
            .field("max_backoff_secs", &self.max_backoff_secs)
            .field("logging", &self.logging)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            org_name: String::new(),
            api_token: String::new(),
            base_url: default_base_url(),
            endpoint: None,
            parallelism: default_parallelism(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
            min_backoff_secs: default_min_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "okta.com".into()
}
fn default_parallelism() -> usize {
    1
}
fn default_max_retries() -> u32 {
    5
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_min_backoff_secs() -> u64 {
    1
}
fn default_max_backoff_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_none() && self.org_name.trim().is_empty() {
            return Err("org_name is required unless endpoint is set".into());
        }
        if self.api_token.trim().is_empty() {
            return Err("api_token must not be empty".into());
        }
        if self.parallelism == 0 {
            return Err("parallelism must be > 0".into());
        }
        if self.max_retries > MAX_RETRIES_CEILING {
            return Err(format!("max_retries must be <= {MAX_RETRIES_CEILING}"));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be > 0".into());
        }
        if self.min_backoff_secs > self.max_backoff_secs {
            return Err("min_backoff_secs must be <= max_backoff_secs".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.api_base_url().map(|_| ())
    }

    /// API root: `endpoint` if set, otherwise `https://{org_name}.{base_url}`.
    pub fn api_base_url(&self) -> Result<Url, String> {
        let raw = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.{}", self.org_name, self.base_url),
        };
        Url::parse(&raw).map_err(|e| format!("invalid API URL '{raw}': {e}"))
    }

    /// Client settings derived from this configuration.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let base_url = self.api_base_url().map_err(ConfigError::Invalid)?;
        let retry = RetryPolicy::new(self.max_retries).with_backoff(
            Duration::from_secs(self.min_backoff_secs),
            Duration::from_secs(self.max_backoff_secs),
        );
        Ok(ClientConfig::new(base_url, self.api_token.clone())
            .with_parallelism(self.parallelism)
            .with_retry(retry)
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs)))
    }
}

pub mod loader {
    use super::ProviderConfig;
    use crate::error::ConfigError;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "okta.toml";

    pub fn load_config(path: Option<&str>) -> Result<ProviderConfig, ConfigError> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        } else if path.is_some() {
            return Err(ConfigError::Load(format!(
                "config file not found: {}",
                pathbuf.display()
            )));
        }
        // Environment variable overrides, e.g. OKTA_ORG_NAME=acme, OKTA_LOGGING__LEVEL=debug
        builder = builder.add_source(
            Environment::with_prefix("OKTA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        let cfg = builder
            .build()
            .map_err(|e| ConfigError::Load(format!("config build error: {e}")))?;
        let merged: ProviderConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("config deserialize error: {e}")))?;
        merged.validate().map_err(ConfigError::Invalid)?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProviderConfig {
        ProviderConfig {
            org_name: "acme".into(),
            api_token: "token".into(),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = ProviderConfig::default();
        assert_eq!(cfg.base_url, "okta.com");
        assert_eq!(cfg.parallelism, 1);
        assert_eq!(cfg.max_retries, 5);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_api_base_url() {
        assert_eq!(
            valid().api_base_url().unwrap().as_str(),
            "https://acme.okta.com/"
        );

        let preview = ProviderConfig {
            base_url: "oktapreview.com".into(),
            ..valid()
        };
        assert_eq!(
            preview.api_base_url().unwrap().as_str(),
            "https://acme.oktapreview.com/"
        );

        let local = ProviderConfig {
            org_name: String::new(),
            endpoint: Some("http://127.0.0.1:8080".into()),
            ..valid()
        };
        assert!(local.validate().is_ok());
        assert_eq!(local.api_base_url().unwrap().as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_validation_failures() {
        assert!(valid().validate().is_ok());

        let cases = [
            ProviderConfig {
                org_name: String::new(),
                ..valid()
            },
            ProviderConfig {
                api_token: " ".into(),
                ..valid()
            },
            ProviderConfig {
                parallelism: 0,
                ..valid()
            },
            ProviderConfig {
                max_retries: 101,
                ..valid()
            },
            ProviderConfig {
                min_backoff_secs: 10,
                max_backoff_secs: 5,
                ..valid()
            },
            ProviderConfig {
                logging: LoggingConfig {
                    level: "verbose".into(),
                },
                ..valid()
            },
            ProviderConfig {
                endpoint: Some("not a url".into()),
                ..valid()
            },
        ];
        for cfg in cases {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn test_client_config() {
        let cfg = ProviderConfig {
            parallelism: 4,
            max_retries: 2,
            min_backoff_secs: 2,
            max_backoff_secs: 8,
            ..valid()
        };
        let client = cfg.client_config().unwrap();
        assert_eq!(client.parallelism, 4);
        assert_eq!(client.retry.max_retries, 2);
        assert_eq!(client.retry.min_backoff, Duration::from_secs(2));
        assert_eq!(client.retry.max_backoff, Duration::from_secs(8));
        assert_eq!(client.api_token, "token");
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", valid());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("\"token\""));
    }
}
