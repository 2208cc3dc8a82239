//! Queue entries: a held operation plus the means to release it

use crate::core::sync::recover_lock;
use crate::link::error::LinkError;
use crate::operation::api::{NextLink, Operation, ResultStream};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// What the waiting caller receives when its entry leaves the queue
pub(crate) enum Release {
    /// The operation was forwarded; the caller now reads this stream
    Forwarded(ResultStream),
    /// The operation will never be forwarded
    Rejected(LinkError),
}

/// One deferred operation
///
/// Entries are compared by identity (`Arc::ptr_eq`), never by content, so
/// two structurally equal operations remain distinct entries.
pub(crate) struct QueueEntry {
    operation: Operation,
    forward: Arc<dyn NextLink>,
    observer: Mutex<Option<oneshot::Sender<Release>>>,
}

impl QueueEntry {
    pub(crate) fn new(
        operation: Operation,
        forward: Arc<dyn NextLink>,
        observer: oneshot::Sender<Release>,
    ) -> Self {
        Self {
            operation,
            forward,
            observer: Mutex::new(Some(observer)),
        }
    }

    pub(crate) fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Run the rest of the chain for this entry's operation
    pub(crate) fn forward(&self) -> ResultStream {
        self.forward.forward(self.operation.clone())
    }

    /// Hand the outcome to the waiting caller
    ///
    /// Only the first release is delivered. Returns false if the caller has
    /// already gone away or the entry was released before; in that case the
    /// outcome (and any forwarded stream in it) is dropped here.
    pub(crate) fn release(&self, outcome: Release) -> bool {
        let sender = recover_lock(self.observer.lock(), "queue entry").take();
        match sender {
            Some(sender) => sender.send(outcome).is_ok(),
            None => false,
        }
    }
}
