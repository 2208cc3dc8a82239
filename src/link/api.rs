//! Public API for the queue link
//!
//! External modules should import from here rather than directly from internal modules.

// Gate
pub use crate::link::queue_link::{QueueLink, QueueLinkBuilder};

// Policies
pub use crate::link::policy::{is_structural_duplicate, DrainPolicy, DuplicateCheck, KeepPolicy};

// Snapshots
pub use crate::link::snapshot::{ChainClient, Client, SerializedOperation};

// Error handling
pub use crate::link::error::{LinkError, LinkResult};
