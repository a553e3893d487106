//! Domain errors for the issue synchronizers.

use std::path::PathBuf;

use thiserror::Error;

use super::models::CodecError;
use super::ports::TrackerError;

/// Failure of the local issue store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors produced by the pull and push synchronizers.
///
/// Only [`SyncError::Conflict`] and failures to list the source collection
/// abort a run; everything else is reported per item.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Conflict detected in {path}. Remote version is newer but local content differs.")]
    Conflict { path: String },

    #[error(transparent)]
    Remote(#[from] TrackerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: CodecError,
    },

    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: CodecError,
    },

    #[error("Invalid issue in {path}: {reason}")]
    InvalidIssue { path: String, reason: String },
}

impl SyncError {
    /// True for errors that must stop the whole run.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
