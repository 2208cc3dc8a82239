//! Generic error handling utilities
//!
//! Provides one logging path for the error types of the link, store and
//! config domains, while letting each domain decide how much of the error
//! is meaningful to the embedding application.

/// Trait for errors that can distinguish between caller-actionable and internal errors
///
/// Caller-actionable errors (a malformed snapshot, an invalid config value)
/// carry a message worth surfacing as is. Internal errors (IO failures,
/// poisoned state) are logged with generic context and the detail goes to
/// debug level.
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a specific message that should be
    /// shown to whoever configured or drives the link
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// Unlike a fatal handler this never aborts: the link keeps running after a
/// failed restore or persist, so errors are logged at `warn` level.
///
/// # Arguments
/// * `error` - The error to log (must implement ContextualError)
/// * `operation_context` - Human-readable description of the operation that failed
///
/// # Examples
/// ```rust
/// use queuelink::core::error_handling::log_error_with_context;
/// use queuelink::link::api::LinkError;
///
/// let err = LinkError::MalformedSnapshot {
///     message: "no operation definition found".to_string(),
/// };
/// log_error_with_context(&err, "Restoring queued operations");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::warn!("{}: {}", operation_context, user_msg);
        }
        _ => {
            log::warn!("{} failed", operation_context);
        }
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
