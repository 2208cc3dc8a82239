//! Synchronization utilities for robust lock handling
//!
//! The link and the event bus only ever mutate their guarded state with
//! plain assignments, so a poisoned lock still protects consistent data.
//! These helpers recover the guard instead of propagating the poison, and
//! leave a warning in the log so the original panic is not silently lost.

use std::sync::LockResult;

/// Recover a guard from a lock operation, logging if the lock was poisoned
///
/// Works for `Mutex::lock`, `RwLock::read` and `RwLock::write` alike.
///
/// # Arguments
/// * `result` - The result from a lock operation
/// * `context` - Short description of the lock owner, used in the log line
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use queuelink::core::sync::recover_lock;
///
/// let mutex = Mutex::new(42);
/// let guard = recover_lock(mutex.lock(), "example");
/// assert_eq!(*guard, 42);
/// ```
pub fn recover_lock<G>(result: LockResult<G>, context: &str) -> G {
    result.unwrap_or_else(|poison_err| {
        log::warn!(
            "Internal synchronisation error in {} (lock poisoned). A panic occurred while holding the lock; continuing with the inner state",
            context
        );
        poison_err.into_inner()
    })
}
