//! QueueEventBus implementation

use crate::core::sync::recover_lock;
use crate::notifications::event::{EventKind, QueueEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Identifier handed out by [`QueueEventBus::add_listener`]
pub type ListenerId = u64;

/// Callback invoked for matching queue events
pub type Listener = Arc<dyn Fn(&QueueEvent) + Send + Sync>;

/// Registry of queue listeners keyed by operation name and event kind
///
/// Each link owns a bus; several links can share one by passing the same
/// `Arc<QueueEventBus>` to their builders, in which case registrations
/// form a namespace shared by exactly those links.
///
/// Listeners run synchronously on the thread that changed the queue, in
/// registration order, with no lock held. A panicking listener is not
/// caught and unwinds into the link call that triggered it.
pub struct QueueEventBus {
    next_listener_id: AtomicU64,
    listeners: RwLock<HashMap<String, Vec<(ListenerId, Listener)>>>,
}

impl Default for QueueEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueEventBus {
    pub fn new() -> Self {
        Self {
            next_listener_id: AtomicU64::new(1),
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Registry key: lowercase(operation name + event kind)
    ///
    /// `Change` ignores the operation name.
    pub fn key(operation_name: &str, kind: EventKind) -> String {
        let name = if kind.is_named() { operation_name } else { "" };
        format!("{}{}", name, kind.as_ref()).to_lowercase()
    }

    pub fn add_listener<F>(&self, operation_name: &str, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let key = Self::key(operation_name, kind);
        log::trace!("Adding queue listener {} for '{}'", id, key);

        recover_lock(self.listeners.write(), "queue event bus")
            .entry(key)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove one registration; returns false if it was not registered
    pub fn remove_listener(&self, operation_name: &str, kind: EventKind, id: ListenerId) -> bool {
        let key = Self::key(operation_name, kind);
        let mut listeners = recover_lock(self.listeners.write(), "queue event bus");

        let Some(registrations) = listeners.get_mut(&key) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|(listener_id, _)| *listener_id != id);
        let removed = registrations.len() != before;

        if registrations.is_empty() {
            listeners.remove(&key);
        }
        if removed {
            log::trace!("Removed queue listener {} for '{}'", id, key);
        }
        removed
    }

    pub fn listener_count(&self, operation_name: &str, kind: EventKind) -> usize {
        recover_lock(self.listeners.read(), "queue event bus")
            .get(&Self::key(operation_name, kind))
            .map_or(0, Vec::len)
    }

    pub fn has_listeners(&self, operation_name: &str, kind: EventKind) -> bool {
        self.listener_count(operation_name, kind) > 0
    }

    /// Number of distinct keys with at least one listener
    pub fn key_count(&self) -> usize {
        recover_lock(self.listeners.read(), "queue event bus").len()
    }

    pub fn clear(&self) {
        recover_lock(self.listeners.write(), "queue event bus").clear();
    }

    /// Deliver an event to the listeners registered for its name and kind
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &QueueEvent) -> usize {
        let key = Self::key(event.operation_name(), event.kind);
        let snapshot: Vec<Listener> = {
            let listeners = recover_lock(self.listeners.read(), "queue event bus");
            match listeners.get(&key) {
                Some(registrations) => registrations
                    .iter()
                    .map(|(_, listener)| Arc::clone(listener))
                    .collect(),
                None => return 0,
            }
        };

        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }
}
