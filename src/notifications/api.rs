//! Public API for queue listeners
//!
//! This module provides the complete public API for the listener registry.
//! External modules should import from here rather than directly from internal modules.

pub use crate::notifications::bus::{Listener, ListenerId, QueueEventBus};
pub use crate::notifications::event::{EventKind, QueueEvent};
