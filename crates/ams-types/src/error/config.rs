//! Configuration-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading service configuration.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// A required setting was not supplied by file, flag or environment
    #[error("Missing required setting: {field}")]
    Missing {
        /// Name of the absent setting
        field: String,
    },

    /// Config file could not be read
    #[error("Config read error for {path}: {message}")]
    Io {
        /// Filesystem path of the config file
        path: String,
        /// Description of the read failure
        message: String,
    },

    /// Config file parse error
    #[error("Config parse error: {message}")]
    Parse {
        /// Description of the parse failure
        message: String,
    },

    /// Config validation error (out of range values)
    #[error("Config validation error for {field}: {message}")]
    Invalid {
        /// Name of the field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

impl ConfigError {
    /// Create a parse error from a serde_json error.
    pub fn from_json_error(e: &serde_json::Error) -> Self {
        Self::Parse { message: e.to_string() }
    }

    /// Create a read error from an IO error.
    pub fn from_io_error(path: &std::path::Path, e: &std::io::Error) -> Self {
        Self::Io { path: path.display().to_string(), message: e.to_string() }
    }
}
