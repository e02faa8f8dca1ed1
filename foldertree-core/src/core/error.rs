//! Error types for the folder tree core library.
//!
//! Tree mutations never fail: invalid requests degrade to no-ops, and
//! deletion reports its refusals through [`DeleteError`](super::delete::DeleteError).
//! [`FolderTreeError`] covers the surrounding surface only, i.e. settings
//! parsing and serializing a state for the storage layer.

use thiserror::Error;

/// All errors that can occur within the folder tree core library.
#[derive(Debug, Error)]
pub enum FolderTreeError {
    /// A document could not be serialized to or parsed from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings parsed but carry a value the engine cannot work with.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Convenience alias that pins the error type to [`FolderTreeError`].
pub type Result<T> = std::result::Result<T, FolderTreeError>;

impl FolderTreeError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Json(e) => format!("Data format error: {e}"),
            Self::InvalidSettings(msg) => format!("Settings error: {msg}"),
        }
    }
}
