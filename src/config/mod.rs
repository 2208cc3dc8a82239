//! Link configuration
//!
//! A [`LinkConfig`] carries the options a queue link is built from: keep
//! policy, drain policy, the exclusion filter and optional persistence.
//! Configs are plain serde structs, usually read from a TOML file.

pub(crate) mod error;
pub(crate) mod link_config;

pub mod api;

pub use link_config::LinkConfig;
