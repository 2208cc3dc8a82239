//! Snapshot persistence for queue links
//!
//! A [`QueueStore`](api::QueueStore) writes the operations held by a link to
//! a [`StoreEngine`](api::StoreEngine) and replays them on a client after a
//! restart. Only the request half of each entry is stored; callers waiting
//! on the original streams are gone once the process exits.
//!
//! ## Engines
//!
//! - `MemoryStore`: a map behind a tokio mutex, for tests and for keeping a
//!   snapshot across link instances inside one process
//! - `FileStore`: one JSON file per store key in a directory, the platform
//!   data directory by default
//!
//! Any other backend plugs in by implementing `StoreEngine`.

pub(crate) mod engine;
pub(crate) mod error;
pub(crate) mod queue_store;

pub mod api;
