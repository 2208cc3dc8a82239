//! Request gate for GraphQL link chains
//!
//! A [`QueueLink`](link::api::QueueLink) sits in a chain of links and
//! either forwards operations straight on or, while closed, holds them
//! until it is opened again. Held operations can be deduplicated, observed
//! through listeners, and persisted so they survive a restart.

pub mod config;
pub mod core;
pub mod link;
pub mod notifications;
pub mod operation;
pub mod store;
