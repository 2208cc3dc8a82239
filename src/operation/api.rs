//! Public API for operations and the link chain
//!
//! External modules should import from here rather than directly from internal modules.

pub use crate::operation::chain::{chain, Link, NextLink, ResultStream};
pub use crate::operation::document::{
    inspect_document, operation_definitions, select_operation, OperationHeader, OperationKind,
};
pub use crate::operation::types::{FetchResult, Operation, SKIP_QUEUE_KEY};
