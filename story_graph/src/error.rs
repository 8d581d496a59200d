//! Error types. Only storage and configuration can fail; editor operations
//! report "nothing changed" through their return values instead.

use thiserror::Error;

/// Failure reading or writing persisted key-value state.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed stored value: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure loading an [`EditorConfig`](crate::EditorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
