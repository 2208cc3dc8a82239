//! Config Error Types

use crate::core::error_handling::ContextualError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration syntax: {message}")]
    Parse { message: String },

    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ConfigError::Parse { .. } | ConfigError::Invalid { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Parse { message } | ConfigError::Invalid { message, .. } => Some(message),
            ConfigError::Io { .. } => None,
        }
    }
}
