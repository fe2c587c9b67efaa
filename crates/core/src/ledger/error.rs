//! Error types for the ledger module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, updating or saving a ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The identifier is not part of the sequence this ledger tracks.
    #[error("Identifier not in manifest: {identifier}")]
    NotInManifest { identifier: String },

    /// Failed to read the ledger file.
    #[error("Failed to read ledger: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the ledger file.
    #[error("Failed to write ledger: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed as `identifier=status`.
    #[error("Malformed ledger line {line} in {path}: {content:?}")]
    Malformed {
        path: PathBuf,
        line: usize,
        content: String,
    },
}
