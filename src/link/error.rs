//! Link Error Types

use crate::core::error_handling::ContextualError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinkError {
    /// Delivered to an operation dropped by the `first` or `last` keep policy
    #[error("Operation suppressed by queue deduplication")]
    DeduplicationSuppressed,

    /// Produced by the forwarding chain; the queue link relays it untouched
    #[error("Forwarded operation failed: {message}")]
    Forwarded { message: String },

    #[error("Malformed queue snapshot: {message}")]
    MalformedSnapshot { message: String },

    #[error("Malformed GraphQL document: {message}")]
    MalformedDocument { message: String },

    #[error("Queue link internal error: {message}")]
    Internal { message: String },
}

/// Result type for link operations
pub type LinkResult<T> = Result<T, LinkError>;

impl ContextualError for LinkError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            LinkError::MalformedSnapshot { .. } | LinkError::MalformedDocument { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            LinkError::MalformedSnapshot { message } | LinkError::MalformedDocument { message } => {
                Some(message)
            }
            _ => None,
        }
    }
}
