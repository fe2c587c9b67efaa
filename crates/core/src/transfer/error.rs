//! Error types for the transfer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while transferring a sequence.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Failed to create or purge the destination directory.
    #[error("Failed to prepare destination: {path}")]
    DestinationPrepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy a file or create a directory in the destination.
    #[error("Failed to copy {from} to {to}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove part of the source after copying.
    #[error("Failed to clean up source: {path}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the completion marker.
    #[error("Failed to write completion marker: {path}")]
    MarkerWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransferError {
    /// Creates a copy error.
    pub fn copy(from: PathBuf, to: PathBuf, source: std::io::Error) -> Self {
        Self::Copy { from, to, source }
    }

    /// Whether the failure may have left a partially copied destination.
    pub fn leaves_partial_destination(&self) -> bool {
        matches!(self, Self::Copy { .. })
    }
}
