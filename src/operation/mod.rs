//! Operations, results and the link chain contracts
//!
//! These are the collaborators the queue link is written against. The host
//! client supplies the terminating link (transport) and any further
//! middleware; the types here only describe what flows between them.

pub(crate) mod chain;
pub(crate) mod document;
pub(crate) mod types;

pub mod api;
