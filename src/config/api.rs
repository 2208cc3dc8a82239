//! Public API for link configuration

pub use crate::config::error::{ConfigError, ConfigResult};
pub use crate::config::link_config::{LinkConfig, StoreConfig, DEFAULT_STORE_KEY};
