//! QueueLink - open/close gate holding operations while closed
//!
//! While open, requests go straight to the rest of the chain. While closed,
//! each request becomes a lazily subscribed stream: the first poll appends
//! an entry to the queue and dropping the stream before release removes
//! it again. Opening the link releases the queue according to the
//! configured [`DrainPolicy`].

use crate::config::LinkConfig;
use crate::core::sync::recover_lock;
use crate::link::entry::{QueueEntry, Release};
use crate::link::error::LinkError;
use crate::link::policy::{default_duplicate_check, DrainPolicy, DuplicateCheck, KeepPolicy};
use crate::link::request::{DrainOnSettle, QueuedRequest};
use crate::notifications::api::{EventKind, ListenerId, QueueEvent, QueueEventBus};
use crate::operation::api::{Link, NextLink, Operation, OperationKind, ResultStream};
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

struct LinkState {
    is_open: bool,
    queue: VecDeque<Arc<QueueEntry>>,
    /// Operation kinds that bypass the queue while closed
    filter: Vec<OperationKind>,
    /// A sequentially drained entry has been forwarded and not yet settled
    in_flight: bool,
}

pub(crate) struct LinkInner {
    state: Mutex<LinkState>,
    keep_policy: KeepPolicy,
    drain_policy: DrainPolicy,
    duplicate_check: DuplicateCheck,
    events: Arc<QueueEventBus>,
}

/// Request gate for a link chain
///
/// Cloning is cheap and every clone controls the same queue.
///
/// # Example
///
/// ```rust
/// use futures::{stream, FutureExt, StreamExt};
/// use queuelink::link::api::QueueLink;
/// use queuelink::operation::api::{FetchResult, NextLink, Operation, ResultStream};
/// use std::sync::Arc;
///
/// let terminal: Arc<dyn NextLink> = Arc::new(|_op: Operation| -> ResultStream {
///     stream::iter(vec![Ok(FetchResult::default())]).boxed()
/// });
///
/// let link = QueueLink::new();
/// link.close();
///
/// let mut results = link.request(Operation::parse("{ hello }").unwrap(), terminal);
/// // Polling subscribes; the operation is now held
/// assert!(results.next().now_or_never().is_none());
/// assert_eq!(link.len(), 1);
///
/// link.open();
/// assert_eq!(link.len(), 0);
/// assert!(matches!(results.next().now_or_never(), Some(Some(Ok(_)))));
/// ```
#[derive(Clone)]
pub struct QueueLink {
    inner: Arc<LinkInner>,
}

impl Default for QueueLink {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueLink {
    /// An open link that queues everything while closed and drains all at once
    pub fn new() -> Self {
        QueueLinkBuilder::new().build()
    }

    pub fn builder() -> QueueLinkBuilder {
        QueueLinkBuilder::new()
    }

    pub fn with_config(config: &LinkConfig) -> Self {
        QueueLinkBuilder::new().config(config).build()
    }

    /// An open link reporting to a shared listener registry
    pub fn with_event_bus(events: Arc<QueueEventBus>) -> Self {
        QueueLinkBuilder::new().event_bus(events).build()
    }

    /// An open link using `check` to find duplicates under `first`/`last`
    pub fn with_duplicate_check<F>(keep_policy: KeepPolicy, check: F) -> Self
    where
        F: Fn(&Operation, &Operation) -> bool + Send + Sync + 'static,
    {
        QueueLinkBuilder::new()
            .keep_policy(keep_policy)
            .duplicate_check(check)
            .build()
    }

    /// Open the gate and release queued operations
    ///
    /// Calling `open` on an open link drains whatever is queued, which is
    /// nothing for the `all` drain policy.
    pub fn open(&self) {
        self.inner.open();
    }

    /// Close the gate; queued operations are untouched
    pub fn close(&self) {
        self.inner.state().is_open = false;
        log::trace!("Queue link closed");
    }

    pub fn is_open(&self) -> bool {
        self.inner.state().is_open
    }

    /// Number of operations currently held
    pub fn len(&self) -> usize {
        self.inner.state().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Held operations in arrival order
    pub fn queued_operations(&self) -> Vec<Operation> {
        self.inner.snapshot()
    }

    /// Replace the set of operation kinds that bypass the queue while closed
    ///
    /// Already queued operations stay queued.
    pub fn set_filter(&self, kinds: Vec<OperationKind>) {
        log::debug!("Queue link filter set to {:?}", kinds);
        self.inner.state().filter = kinds;
    }

    pub fn filter(&self) -> Vec<OperationKind> {
        self.inner.state().filter.clone()
    }

    pub fn keep_policy(&self) -> KeepPolicy {
        self.inner.keep_policy
    }

    pub fn drain_policy(&self) -> DrainPolicy {
        self.inner.drain_policy
    }

    /// The listener registry this link reports to
    pub fn events(&self) -> &Arc<QueueEventBus> {
        &self.inner.events
    }

    pub fn add_listener<F>(&self, operation_name: &str, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        self.inner.events.add_listener(operation_name, kind, listener)
    }

    pub fn remove_listener(&self, operation_name: &str, kind: EventKind, id: ListenerId) -> bool {
        self.inner.events.remove_listener(operation_name, kind, id)
    }

    /// Gate one operation
    ///
    /// Forwards immediately when the link is open with nothing left to
    /// drain, when the operation's context sets `skipQueue`, or when its
    /// kind is in the filter. Otherwise returns a stream that joins the
    /// queue when first polled, so a sequential drain keeps arrival order.
    pub fn request(&self, operation: Operation, forward: Arc<dyn NextLink>) -> ResultStream {
        if self.inner.bypasses_queue(&operation) {
            return forward.forward(operation);
        }
        QueuedRequest::new(Arc::downgrade(&self.inner), operation, forward).boxed()
    }
}

impl Link for QueueLink {
    fn request(&self, operation: Operation, forward: Arc<dyn NextLink>) -> ResultStream {
        QueueLink::request(self, operation, forward)
    }
}

impl LinkInner {
    fn state(&self) -> MutexGuard<'_, LinkState> {
        recover_lock(self.state.lock(), "queue link")
    }

    fn bypasses_queue(&self, operation: &Operation) -> bool {
        let state = self.state();
        if state.is_open && state.queue.is_empty() && !state.in_flight {
            return true;
        }
        if operation.skip_queue() {
            log::trace!("Operation '{}' skips the closed queue", operation.name());
            return true;
        }
        if state.filter.contains(&operation.kind) {
            log::trace!(
                "Operation '{}' bypasses the closed queue: {} is filtered",
                operation.name(),
                operation.kind
            );
            return true;
        }
        false
    }

    fn snapshot(&self) -> Vec<Operation> {
        self.state()
            .queue
            .iter()
            .map(|entry| entry.operation().clone())
            .collect()
    }

    fn emit_for(&self, kind: EventKind, operation: &Operation) {
        if self.events.has_listeners(operation.name(), kind) {
            self.events.emit(&QueueEvent::for_operation(kind, operation.clone()));
        }
    }

    fn emit_change(&self) {
        if self.events.has_listeners("", EventKind::Change) {
            self.events.emit(&QueueEvent::change(self.snapshot()));
        }
    }

    /// Subscription of a queued request: apply the keep policy and append
    pub(crate) fn enqueue(self: &Arc<Self>, entry: Arc<QueueEntry>) {
        enum Outcome {
            ForwardNow,
            Rejected,
            Queued { evicted: Option<Arc<QueueEntry>> },
        }

        let outcome = {
            let mut state = self.state();
            if state.is_open && state.queue.is_empty() && !state.in_flight {
                // Opened between request() and the first poll
                Outcome::ForwardNow
            } else {
                let duplicate = match self.keep_policy {
                    KeepPolicy::All => None,
                    KeepPolicy::First | KeepPolicy::Last => state.queue.iter().position(|queued| {
                        (self.duplicate_check)(queued.operation(), entry.operation())
                    }),
                };
                match (self.keep_policy, duplicate) {
                    (KeepPolicy::First, Some(_)) => Outcome::Rejected,
                    (KeepPolicy::Last, Some(position)) => {
                        let evicted = state.queue.remove(position);
                        state.queue.push_back(Arc::clone(&entry));
                        Outcome::Queued { evicted }
                    }
                    _ => {
                        state.queue.push_back(Arc::clone(&entry));
                        Outcome::Queued { evicted: None }
                    }
                }
            }
        };

        let operation = entry.operation();
        match outcome {
            Outcome::ForwardNow => {
                entry.release(Release::Forwarded(entry.forward()));
            }
            Outcome::Rejected => {
                log::debug!(
                    "Rejected duplicate operation '{}'; an equivalent one is already queued",
                    operation.name()
                );
                entry.release(Release::Rejected(LinkError::DeduplicationSuppressed));
            }
            Outcome::Queued { evicted } => {
                if let Some(evicted) = evicted {
                    log::debug!(
                        "Evicted queued duplicate of operation '{}'",
                        evicted.operation().name()
                    );
                    evicted.release(Release::Rejected(LinkError::DeduplicationSuppressed));
                    self.emit_for(EventKind::Cancel, evicted.operation());
                }
                log::debug!("Queued {} '{}'", operation.kind, operation.name());
                self.emit_for(EventKind::Enqueue, operation);
                self.emit_change();
            }
        }
    }

    /// Remove a still-queued entry; no-op once it has left the queue
    pub(crate) fn cancel(&self, entry: &Arc<QueueEntry>) {
        let removed = {
            let mut state = self.state();
            match state.queue.iter().position(|queued| Arc::ptr_eq(queued, entry)) {
                Some(position) => state.queue.remove(position),
                None => None,
            }
        };

        if let Some(removed) = removed {
            log::debug!("Cancelled queued operation '{}'", removed.operation().name());
            self.emit_for(EventKind::Cancel, removed.operation());
            self.emit_change();
        }
    }

    fn open(self: &Arc<Self>) {
        let queued = {
            let mut state = self.state();
            state.is_open = true;
            state.queue.len()
        };
        log::trace!("Queue link opened with {} queued operations", queued);

        match self.drain_policy {
            DrainPolicy::All => self.drain_all(),
            DrainPolicy::Sequential => self.drain_next(),
        }
    }

    fn drain_all(self: &Arc<Self>) {
        loop {
            // A listener may close the link again mid-drain
            let entry = {
                let mut state = self.state();
                if !state.is_open {
                    break;
                }
                match state.queue.pop_front() {
                    Some(entry) => entry,
                    None => break,
                }
            };
            self.dispatch(entry, false);
        }
    }

    fn drain_next(self: &Arc<Self>) {
        let entry = {
            let mut state = self.state();
            if !state.is_open || state.in_flight {
                return;
            }
            match state.queue.pop_front() {
                Some(entry) => {
                    state.in_flight = true;
                    entry
                }
                None => return,
            }
        };
        self.dispatch(entry, true);
    }

    /// The forwarded stream of a sequentially drained entry terminated or
    /// was dropped
    pub(crate) fn on_forward_settled(self: &Arc<Self>) {
        self.state().in_flight = false;
        self.drain_next();
    }

    fn dispatch(self: &Arc<Self>, entry: Arc<QueueEntry>, sequential: bool) {
        let operation = entry.operation();
        log::debug!("Dequeued {} '{}'", operation.kind, operation.name());
        self.emit_for(EventKind::Dequeue, operation);

        let mut results = entry.forward();
        if sequential {
            results = DrainOnSettle::new(results, Arc::downgrade(self)).boxed();
        }
        if !entry.release(Release::Forwarded(results)) {
            log::debug!(
                "Caller of '{}' went away before its results were delivered",
                operation.name()
            );
        }
        self.emit_change();
    }
}

/// Builder for [`QueueLink`]
pub struct QueueLinkBuilder {
    keep_policy: KeepPolicy,
    drain_policy: DrainPolicy,
    filter: Vec<OperationKind>,
    duplicate_check: Option<DuplicateCheck>,
    events: Option<Arc<QueueEventBus>>,
    start_closed: bool,
}

impl Default for QueueLinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueLinkBuilder {
    pub fn new() -> Self {
        Self {
            keep_policy: KeepPolicy::default(),
            drain_policy: DrainPolicy::default(),
            filter: Vec::new(),
            duplicate_check: None,
            events: None,
            start_closed: false,
        }
    }

    /// Take keep policy, drain policy and filter from a config
    pub fn config(mut self, config: &LinkConfig) -> Self {
        self.keep_policy = config.keep_policy;
        self.drain_policy = config.drain_policy;
        self.filter = config.filter.clone();
        self
    }

    pub fn keep_policy(mut self, keep_policy: KeepPolicy) -> Self {
        self.keep_policy = keep_policy;
        self
    }

    pub fn drain_policy(mut self, drain_policy: DrainPolicy) -> Self {
        self.drain_policy = drain_policy;
        self
    }

    pub fn filter(mut self, kinds: Vec<OperationKind>) -> Self {
        self.filter = kinds;
        self
    }

    /// Replace the structural duplicate check used by `first`/`last`
    pub fn duplicate_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Operation, &Operation) -> bool + Send + Sync + 'static,
    {
        self.duplicate_check = Some(Arc::new(check));
        self
    }

    /// Report to a shared listener registry instead of a private one
    pub fn event_bus(mut self, events: Arc<QueueEventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Start in the closed state
    pub fn closed(mut self) -> Self {
        self.start_closed = true;
        self
    }

    pub fn build(self) -> QueueLink {
        QueueLink {
            inner: Arc::new(LinkInner {
                state: Mutex::new(LinkState {
                    is_open: !self.start_closed,
                    queue: VecDeque::new(),
                    filter: self.filter,
                    in_flight: false,
                }),
                keep_policy: self.keep_policy,
                drain_policy: self.drain_policy,
                duplicate_check: self.duplicate_check.unwrap_or_else(default_duplicate_check),
                events: self
                    .events
                    .unwrap_or_else(|| Arc::new(QueueEventBus::new())),
            }),
        }
    }
}
