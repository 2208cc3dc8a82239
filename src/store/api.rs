//! Public API for queue snapshot persistence

pub use crate::store::engine::{FileStore, MemoryStore, StoreEngine};
pub use crate::store::error::{StoreError, StoreResult};
pub use crate::store::queue_store::{QueueStore, RestoreReport};
