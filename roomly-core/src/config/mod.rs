mod client;
mod loader;
pub mod secrets;
pub mod typed;
pub mod value;

use std::collections::HashMap;
use std::ops::Deref;
use std::path::Path;

pub use client::{ClientConfig, LogFormat};
pub use secrets::{DefaultSecretResolver, SecretResolver};
pub use typed::ConfigProperties;
pub use value::{ConfigValue, FromConfigValue};

/// A single validation failure from a typed config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationDetail {
    pub key: String,
    pub message: String,
}

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
    /// Constraint violations reported by a typed section.
    Validation(Vec<ConfigValidationDetail>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Validation(details) => {
                write!(f, "Config validation errors:")?;
                for detail in details {
                    write!(f, "\n  - {}: {}", detail.key, detail.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Environment variable selecting the active profile.
pub const PROFILE_ENV: &str = "ROOMLY_PROFILE";

/// Layered client configuration.
///
/// Resolution order (lowest to highest priority):
/// 1. `roomly.yaml`
/// 2. `roomly-{profile}.yaml`
/// 3. `.env` and `.env.{profile}` (never overwrite variables already set)
/// 4. `${...}` placeholders in string values
/// 5. Environment variables (`ROOMLY_API_URL` overrides `roomly.api.url`)
///
/// `RoomlyConfig<T>` additionally carries a typed section reachable through
/// `Deref<Target = T>`.
#[derive(Debug, Clone)]
pub struct RoomlyConfig<T = ()> {
    values: HashMap<String, ConfigValue>,
    profile: String,
    typed: T,
}

impl RoomlyConfig {
    /// Load configuration from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."), profile, &DefaultSecretResolver)
    }

    /// Load configuration files from `dir` with a custom secret resolver.
    pub fn load_from_dir(
        dir: &Path,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());
        let mut values = HashMap::new();

        loader::load_yaml_file(&dir.join("roomly.yaml"), &mut values)?;
        loader::load_yaml_file(&dir.join(format!("roomly-{profile}.yaml")), &mut values)?;

        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{profile}")));

        resolve_string_values(&mut values, resolver)?;

        for (env_key, env_val) in std::env::vars() {
            if env_key.starts_with("ROOMLY_") {
                values.insert(
                    loader::env_key_to_config_key(&env_key),
                    ConfigValue::String(env_val),
                );
            }
        }

        tracing::debug!(profile = %profile, keys = values.len(), "configuration loaded");
        Ok(RoomlyConfig {
            values,
            profile,
            typed: (),
        })
    }

    /// Build a config from a YAML string (no files, no environment).
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        resolve_string_values(&mut values, &DefaultSecretResolver)?;
        Ok(RoomlyConfig {
            values,
            profile: profile.to_string(),
            typed: (),
        })
    }

    pub fn empty() -> Self {
        RoomlyConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
            typed: (),
        }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Attach a typed section built from the raw values.
    pub fn with_typed<C: ConfigProperties>(self) -> Result<RoomlyConfig<C>, ConfigError> {
        let typed = C::from_config(&self)?;
        Ok(RoomlyConfig {
            values: self.values,
            profile: self.profile,
            typed,
        })
    }
}

impl<T> RoomlyConfig<T> {
    /// Typed lookup of a dot-separated key.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Typed lookup that falls back to `default` when the key is missing.
    ///
    /// A present but malformed value is still an error.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        match self.values.get(key) {
            Some(value) => V::from_config_value(value, key),
            None => Ok(default),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn typed(&self) -> &T {
        &self.typed
    }
}

impl<T> Deref for RoomlyConfig<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.typed
    }
}

fn resolve_string_values(
    values: &mut HashMap<String, ConfigValue>,
    resolver: &dyn SecretResolver,
) -> Result<(), ConfigError> {
    for value in values.values_mut() {
        if let ConfigValue::String(s) = value {
            if s.contains("${") {
                *s = secrets::resolve_placeholders(s, resolver)?;
            }
        }
    }
    Ok(())
}
