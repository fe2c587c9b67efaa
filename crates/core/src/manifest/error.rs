//! Error types for the manifest module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while obtaining a sequence manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No usable descriptor could be found or read.
    #[error("Sequence manifest unavailable in {dir}: {reason}")]
    Unavailable { dir: PathBuf, reason: String },

    /// The manifest was found but lists no files.
    #[error("Sequence manifest is empty: {origin}")]
    Empty { origin: String },
}
