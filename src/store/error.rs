//! Store Error Types

use crate::core::error_handling::ContextualError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store IO failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize queue snapshot: {message}")]
    Serialization { message: String },

    #[error("Malformed queue snapshot under key '{key}': {message}")]
    MalformedSnapshot { key: String, message: String },

    #[error("Invalid store key '{key}'")]
    InvalidKey { key: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl ContextualError for StoreError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            StoreError::MalformedSnapshot { .. } | StoreError::InvalidKey { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StoreError::MalformedSnapshot { message, .. } => Some(message),
            StoreError::InvalidKey { .. } => {
                Some("store keys cannot be empty or contain path separators")
            }
            _ => None,
        }
    }
}
