//! Roomly: the client-side data layer of a rental marketplace.
//!
//! This facade re-exports the Roomly crates behind feature flags:
//!
//! ```ignore
//! use roomly::prelude::*;
//!
//! let config = RoomlyConfig::load("dev")?.with_typed::<ClientConfig>()?;
//! roomly::init_tracing(config.log_format);
//! let session = SessionToken::new();
//! let stores = MarketStores::from_config(&config, Arc::new(session.clone())).await?;
//! stores.rooms.search(RoomFilters::default()).await;
//! ```
//!
//! # Feature flags
//!
//! | Feature     | Default | Crate           |
//! |-------------|---------|-----------------|
//! | `market`    | **yes** | `roomly-market` |
//! | `persist`   | no      | `roomly-cache`  |
//! | `test-util` | no      | `roomly-test`   |
//! | `full`      | no      | All of the above |

pub use roomly_core::*;

pub use roomly_data;
pub use roomly_http;
pub use roomly_store;

#[cfg(feature = "persist")]
pub use roomly_cache;

#[cfg(feature = "market")]
pub use roomly_market;

#[cfg(feature = "test-util")]
pub use roomly_test;

/// Unified prelude: `use roomly::prelude::*`.
pub mod prelude {
    pub use roomly_core::prelude::*;
    pub use roomly_data::prelude::*;
    pub use roomly_http::prelude::*;
    pub use roomly_store::prelude::*;

    #[cfg(feature = "market")]
    pub use roomly_market::prelude::*;
    #[cfg(feature = "market")]
    pub use roomly_market::RoomFilters;
}
