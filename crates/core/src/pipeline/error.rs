//! Error types for the pipeline module.

use std::path::PathBuf;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::lock::LockError;
use crate::manifest::ManifestError;
use crate::transfer::TransferError;

/// Fatal conditions of one invocation. None are retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Trigger file not found: {path}")]
    TriggerNotFound { path: PathBuf },

    #[error("Trigger file has no parent directory: {path}")]
    NoSourceDirectory { path: PathBuf },

    /// The ledger and the files actually arriving disagree.
    #[error("{identifier} is not part of the sequence tracked in {dir}")]
    TriggerNotInManifest { identifier: String, dir: PathBuf },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl PipelineError {
    /// Whether the failure happened before any transfer step ran.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, Self::Transfer(_))
    }
}
