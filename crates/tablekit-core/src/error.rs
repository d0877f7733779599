//! Error types for tablekit

use thiserror::Error;

/// Core error type for data table operations
///
/// `Clone` so that a single fetch outcome can be handed to every caller
/// waiting on the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Preset '{0}' is built-in and cannot be modified")]
    ProtectedPreset(String),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Column '{column}' does not exist in table. Available columns: {available:?}")]
    ColumnResolution {
        column: String,
        available: Vec<String>,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TableError {
    /// Whether this error came from the remote endpoint rather than user input
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Decode(_))
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for tablekit operations
pub type Result<T> = std::result::Result<T, TableError>;
