//! Client configuration.

use std::time::Duration;

use campusgate_auth::RoutePaths;
use thiserror::Error;

pub const DEFAULT_AUTH_TOKEN_KEY: &str = "auth_token";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_API_BASE_URL: &str = "CAMPUSGATE_API_BASE_URL";
const ENV_AUTH_TOKEN_KEY: &str = "CAMPUSGATE_AUTH_TOKEN_KEY";
const ENV_API_TIMEOUT_SECS: &str = "CAMPUSGATE_API_TIMEOUT_SECS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote API, without a trailing slash.
    pub api_base_url: String,
    /// Key under which the bearer credential is persisted.
    pub auth_token_key: String,
    pub timeout: Duration,
    pub paths: RoutePaths,
}

impl ClientConfig {
    pub fn new(api_base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url.as_ref(), ENV_API_BASE_URL)?,
            auth_token_key: DEFAULT_AUTH_TOKEN_KEY.to_string(),
            timeout: DEFAULT_TIMEOUT,
            paths: RoutePaths::default(),
        })
    }

    /// Read the configuration from `CAMPUSGATE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_API_BASE_URL).ok_or(ConfigError::Missing(ENV_API_BASE_URL))?;
        let mut config = Self::new(base_url)?;

        if let Some(key) = lookup(ENV_AUTH_TOKEN_KEY) {
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Invalid {
                    var: ENV_AUTH_TOKEN_KEY,
                    reason: "must not be empty".to_string(),
                });
            }
            config.auth_token_key = key.to_string();
        }

        if let Some(secs) = lookup(ENV_API_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|e| ConfigError::Invalid {
                var: ENV_API_TIMEOUT_SECS,
                reason: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: ENV_API_TIMEOUT_SECS,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_paths(mut self, paths: RoutePaths) -> Self {
        self.paths = paths;
        self
    }
}

fn normalize_base_url(raw: &str, var: &'static str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ConfigError::Missing(var));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("expected an http(s) URL, got '{url}'"),
        });
    }
    Ok(url.to_string())
}
