//! Error types for preset operations
//!
//! Load and save failures are returned to the caller, which decides whether
//! the user gets to see them.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving, loading or selecting presets
#[derive(Debug, Error)]
pub enum PresetError {
    /// Expected preset file does not exist
    #[error("Preset file not found: '{path}'")]
    NotFound { path: PathBuf },

    /// File exists but is not a well-formed document
    #[error("Failed to parse preset '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Well-formed document for some other schema
    #[error("Preset '{path}' has root <{found}>, expected <{expected}>")]
    SchemaMismatch {
        path: PathBuf,
        found: String,
        expected: String,
    },

    /// Writing the file or creating its directory failed
    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Selector id is not in the current id→file map
    #[error("Selector id {id} does not refer to a preset file")]
    StaleReference { id: u32 },

    /// File dialog result for a pick that is not (or no longer) pending
    #[error("File pick #{handle} is not pending")]
    PickNotPending { handle: u64 },
}

impl PresetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PresetError::Io {
            path: path.into(),
            source,
        }
    }
}
