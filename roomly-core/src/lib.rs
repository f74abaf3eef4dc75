//! Core building blocks shared by every Roomly crate: the [`ApiError`]
//! taxonomy, layered configuration, and tracing setup.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{
    ClientConfig, ConfigError, ConfigProperties, ConfigValidationDetail, ConfigValue,
    DefaultSecretResolver, FromConfigValue, LogFormat, RoomlyConfig, SecretResolver,
};
pub use error::{extract_error_message, message_from_body, ApiError, DEFAULT_ERROR_MESSAGE};
pub use telemetry::init_tracing;

pub mod prelude {
    //! Re-exports of the most commonly used core types.
    pub use crate::{extract_error_message, ApiError, ClientConfig, RoomlyConfig};
}
