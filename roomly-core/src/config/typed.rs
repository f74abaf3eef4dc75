use super::{ConfigError, RoomlyConfig};

/// A strongly-typed configuration section built from raw key/value config.
///
/// ```ignore
/// let config = RoomlyConfig::load("dev")?.with_typed::<ClientConfig>()?;
/// let url = &config.api_url;
/// ```
pub trait ConfigProperties: Sized {
    /// Key prefix owned by this section (e.g. `"roomly"`).
    fn prefix() -> &'static str;

    fn from_config(config: &RoomlyConfig) -> Result<Self, ConfigError>;
}
