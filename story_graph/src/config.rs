//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Configuration for a [`StoryEditor`](crate::StoryEditor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Prefix of the storage key holding a project's collapsed scenes.
    /// The full key is `<prefix>_<project id>`.
    pub collapse_key_prefix: String,

    /// Register a pending operation for every mutation.
    pub track_operations: bool,

    /// Emit scene/choice/selection events even before the initial load
    /// completed.
    pub emit_before_load: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            collapse_key_prefix: "collapsedNodes".to_string(),
            track_operations: true,
            emit_before_load: false,
        }
    }
}

impl EditorConfig {
    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.collapse_key_prefix, "collapsedNodes");
        assert!(config.track_operations);
        assert!(!config.emit_before_load);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EditorConfig::from_toml_str("track_operations = false\n").unwrap();
        assert!(!config.track_operations);
        assert_eq!(config.collapse_key_prefix, "collapsedNodes");
    }

    #[test]
    fn test_invalid_toml() {
        let result = EditorConfig::from_toml_str("track_operations = \"maybe\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "collapse_key_prefix = \"hidden\"").unwrap();

        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.collapse_key_prefix, "hidden");
        assert!(config.track_operations);
    }

    #[test]
    fn test_load_missing_file() {
        let result = EditorConfig::load("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
