//! Event types for queue listeners

use crate::operation::api::Operation;
use chrono::{DateTime, Utc};
use strum_macros::{AsRefStr, Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    /// An operation was appended to the queue
    Enqueue,
    /// An operation left the queue and is about to be forwarded
    Dequeue,
    /// The queue contents changed; not tied to an operation name
    Change,
    /// A still-queued operation was dropped by its caller or by deduplication
    Cancel,
}

impl EventKind {
    /// True for kinds registered under an operation name
    pub fn is_named(self) -> bool {
        !matches!(self, EventKind::Change)
    }
}

/// Delivered to listeners, synchronously, while the link is handling an
/// enqueue, dequeue or cancellation
#[derive(Clone, Debug)]
pub struct QueueEvent {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    /// The operation the event is about; `None` for `Change`
    pub operation: Option<Operation>,
    /// Queue contents after the change; only filled for `Change`
    pub queue: Vec<Operation>,
}

impl QueueEvent {
    pub fn for_operation(kind: EventKind, operation: Operation) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            operation: Some(operation),
            queue: Vec::new(),
        }
    }

    pub fn change(queue: Vec<Operation>) -> Self {
        Self {
            kind: EventKind::Change,
            timestamp: Utc::now(),
            operation: None,
            queue,
        }
    }

    /// Name of the operation the event is about, empty for `Change`
    pub fn operation_name(&self) -> &str {
        self.operation.as_ref().map(Operation::name).unwrap_or("")
    }
}
