//! Error types for map document operations.

use thiserror::Error;

use crate::model::ImageRefError;
use crate::tree::TreeError;

/// Errors that can occur while encoding, decoding, saving or loading a map.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document shape does not match the map schema
    #[error("Malformed document: {message}")]
    MalformedDocument {
        /// Description of the schema violation
        message: String,
    },

    /// Version mismatch between expected and found
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version string
        expected: String,
        /// Found version string
        found: String,
    },

    /// Tree construction failed while rebuilding a decoded document
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl FormatError {
    /// Create a malformed document error with a message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Create a malformed document error for a bad inline image.
    pub fn bad_image(location: &str, err: ImageRefError) -> Self {
        Self::malformed(format!("{location}: invalid backgroundImage: {err}"))
    }

    /// Whether this error means the input itself was unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedDocument { .. } | Self::VersionMismatch { .. }
        )
    }
}
