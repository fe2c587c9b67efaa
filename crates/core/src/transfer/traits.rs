//! Trait definitions for the transfer module.

use async_trait::async_trait;

use super::error::TransferError;
use super::types::{TransferJob, TransferReport};

/// Relocates a completed sequence to its destination.
#[async_trait]
pub trait Transferer: Send + Sync {
    /// Returns the name of this transferer implementation.
    fn name(&self) -> &str;

    /// Runs the full transfer for `job`. Single attempt; no retries.
    async fn transfer(&self, job: TransferJob) -> Result<TransferReport, TransferError>;
}
