//! Error types for target descriptor operations.

use std::path::PathBuf;

/// Errors that can occur while building, registering, or resolving targets.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// Malformed descriptor input (empty path, bad source entry shape, ...).
    #[error("configuration error in '{target}': {detail}")]
    Configuration {
        /// Descriptor being built when the problem was found.
        target: String,
        /// Description of the problem.
        detail: String,
    },

    /// A descriptor with this name is already registered.
    #[error("target '{name}' is already registered")]
    DuplicateTarget {
        /// Name that was registered a second time.
        name: String,
    },

    /// No descriptor with this name is registered.
    #[error("unknown target: '{name}'")]
    UnknownTarget {
        /// Name that was looked up, or a parent named by a descriptor.
        name: String,
    },

    /// Walking parent links came back to a descriptor already on the path.
    #[error("cyclic target chain: {}", chain.join(" -> "))]
    CyclicTarget {
        /// The offending path, starting and ending with the repeated name.
        chain: Vec<String>,
    },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading/writing descriptor files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Descriptor file not found.
    #[error("target file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },
}

impl TargetError {
    pub(crate) fn config(target: &str, detail: impl Into<String>) -> Self {
        TargetError::Configuration {
            target: target.to_string(),
            detail: detail.into(),
        }
    }
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
