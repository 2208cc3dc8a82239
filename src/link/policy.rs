//! Keep and drain policies

use crate::operation::api::Operation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum_macros::{Display, EnumString};

/// Which of several equivalent queued operations survives
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    /// Reject a new operation if an equivalent one is already queued
    First,
    /// Evict the queued equivalent and append the new operation
    Last,
    /// Queue everything
    #[default]
    All,
}

/// How the queue is released when the link opens
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DrainPolicy {
    /// Forward every queued entry during `open()`, in arrival order
    #[default]
    All,
    /// Forward the head entry; release the next one only once the previous
    /// forwarded stream has terminated or been dropped
    Sequential,
}

/// Decides whether two operations are duplicates of each other
pub type DuplicateCheck = Arc<dyn Fn(&Operation, &Operation) -> bool + Send + Sync>;

/// Structural equality: same document, same variables, same name
pub fn is_structural_duplicate(a: &Operation, b: &Operation) -> bool {
    a.query == b.query && a.variables == b.variables && a.operation_name == b.operation_name
}

pub(crate) fn default_duplicate_check() -> DuplicateCheck {
    Arc::new(is_structural_duplicate)
}
