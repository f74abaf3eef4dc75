use std::path::PathBuf;
use std::time::Duration;

use super::typed::ConfigProperties;
use super::{ConfigError, ConfigValidationDetail, RoomlyConfig};

/// Log output format for [`init_tracing`](crate::init_tracing).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings consumed by the HTTP wrapper and the persisted stores.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://api.roomly.example/v1`.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Static bearer token; sessions normally set one at runtime instead.
    pub api_token: Option<String>,
    /// Directory for persisted store snapshots. `None` keeps them in memory.
    pub storage_dir: Option<PathBuf>,
    /// Prefix of every persisted snapshot key.
    pub storage_namespace: String,
    /// Default page size for list queries.
    pub page_limit: u32,
    pub log_format: LogFormat,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
    pub const DEFAULT_NAMESPACE: &'static str = "roomly";
    pub const DEFAULT_PAGE_LIMIT: u32 = 20;

    /// Config with defaults for everything but the base URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: Duration::from_millis(Self::DEFAULT_TIMEOUT_MS),
            api_token: None,
            storage_dir: None,
            storage_namespace: Self::DEFAULT_NAMESPACE.to_string(),
            page_limit: Self::DEFAULT_PAGE_LIMIT,
            log_format: LogFormat::Pretty,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }
}

impl ConfigProperties for ClientConfig {
    fn prefix() -> &'static str {
        "roomly"
    }

    fn from_config(config: &RoomlyConfig) -> Result<Self, ConfigError> {
        let api_url: String = config.get("roomly.api.url")?;
        let timeout_ms: u64 = config.get_or("roomly.api.timeout", Self::DEFAULT_TIMEOUT_MS)?;
        let api_token: Option<String> = config.get_or("roomly.api.token", None)?;
        let storage_dir: Option<String> = config.get_or("roomly.storage.dir", None)?;
        let storage_namespace: String = config.get_or(
            "roomly.storage.namespace",
            Self::DEFAULT_NAMESPACE.to_string(),
        )?;
        let page_limit: u32 = config.get_or("roomly.page.limit", Self::DEFAULT_PAGE_LIMIT)?;
        let log_format: String = config.get_or("roomly.log.format", "pretty".to_string())?;

        let mut errors = Vec::new();
        if api_url.trim().is_empty() {
            errors.push(detail("roomly.api.url", "must not be empty"));
        } else if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            errors.push(detail("roomly.api.url", "must start with http:// or https://"));
        }
        if timeout_ms == 0 {
            errors.push(detail("roomly.api.timeout", "must be greater than zero"));
        }
        if page_limit == 0 {
            errors.push(detail("roomly.page.limit", "must be greater than zero"));
        }
        if storage_namespace.trim().is_empty() {
            errors.push(detail("roomly.storage.namespace", "must not be empty"));
        }
        let log_format = match log_format.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                errors.push(detail(
                    "roomly.log.format",
                    &format!("unknown format '{other}' (expected pretty or json)"),
                ));
                LogFormat::Pretty
            }
        };
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(timeout_ms),
            api_token,
            storage_dir: storage_dir.map(PathBuf::from),
            storage_namespace,
            page_limit,
            log_format,
        })
    }
}

fn detail(key: &str, message: &str) -> ConfigValidationDetail {
    ConfigValidationDetail {
        key: key.to_string(),
        message: message.to_string(),
    }
}
