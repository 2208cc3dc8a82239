//! TOML-backed configuration for a queue link

use crate::config::error::{ConfigError, ConfigResult};
use crate::link::api::{DrainPolicy, KeepPolicy};
use crate::operation::api::OperationKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Store key used when a `[store]` table does not name one
pub const DEFAULT_STORE_KEY: &str = "queuelink";

/// Options a queue link is constructed from
///
/// ```toml
/// keep-policy = "last"
/// drain-policy = "sequential"
/// filter = "mutation"            # or ["query", "mutation"]
///
/// [store]
/// store-key = "offline-queue"
/// directory = "/var/lib/myapp"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LinkConfig {
    pub keep_policy: KeepPolicy,
    pub drain_policy: DrainPolicy,
    /// Operation kinds that bypass the queue while the link is closed
    #[serde(deserialize_with = "one_or_many")]
    pub filter: Vec<OperationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,
}

/// Where a queue snapshot is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct StoreConfig {
    pub store_key: String,
    /// Directory for file-backed snapshots; the platform data directory
    /// when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_key: DEFAULT_STORE_KEY.to_string(),
            directory: None,
        }
    }
}

/// Accept both `filter = "mutation"` and `filter = ["query", "mutation"]`
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<OperationKind>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(OperationKind),
        Many(Vec<OperationKind>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(kind) => vec![kind],
        OneOrMany::Many(kinds) => kinds,
    })
}

impl LinkConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub async fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded queue link configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (index, kind) in self.filter.iter().enumerate() {
            if self.filter[..index].contains(kind) {
                return Err(ConfigError::Invalid {
                    field: "filter".to_string(),
                    message: format!("'{}' is listed more than once", kind),
                });
            }
        }

        if let Some(store) = &self.store {
            if store.store_key.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "store.store-key".to_string(),
                    message: "store key cannot be empty".to_string(),
                });
            }
            let key = store.store_key.as_str();
            if key == "."
                || key == ".."
                || key
                    .chars()
                    .any(|c| std::path::is_separator(c) || c.is_control())
            {
                return Err(ConfigError::Invalid {
                    field: "store.store-key".to_string(),
                    message: format!(
                        "store key '{}' must be a plain file name without path separators or control characters",
                        key
                    ),
                });
            }
        }
        Ok(())
    }
}
