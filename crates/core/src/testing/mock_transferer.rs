//! Mock transferer for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transfer::{TransferError, TransferJob, TransferReport, Transferer};

/// A recorded transfer job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTransfer {
    /// The job that was submitted.
    pub job: TransferJob,
    /// Whether the transfer succeeded.
    pub success: bool,
}

/// Mock implementation of the Transferer trait.
///
/// Records every job instead of touching the file system, and can be told to
/// fail the next transfer.
///
/// # Example
///
/// ```rust,ignore
/// use rawsync_core::testing::MockTransferer;
///
/// let transferer = MockTransferer::new();
/// let pipeline = AcquisitionPipeline::new(config, transferer.clone());
///
/// pipeline.run(&trigger).await?;
/// assert_eq!(transferer.transfer_count().await, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransferer {
    /// Recorded transfers.
    transfers: Arc<RwLock<Vec<RecordedTransfer>>>,
    /// If set, the next transfer will fail with this error.
    next_error: Arc<RwLock<Option<TransferError>>>,
}

impl MockTransferer {
    /// Create a new mock transferer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded transfers.
    pub async fn recorded_transfers(&self) -> Vec<RecordedTransfer> {
        self.transfers.read().await.clone()
    }

    /// Get the number of transfers attempted.
    pub async fn transfer_count(&self) -> usize {
        self.transfers.read().await.len()
    }

    /// Configure the next transfer to fail with the given error.
    pub async fn set_next_error(&self, error: TransferError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<TransferError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Transferer for MockTransferer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transfer(&self, job: TransferJob) -> Result<TransferReport, TransferError> {
        if let Some(error) = self.take_error().await {
            self.transfers.write().await.push(RecordedTransfer {
                job,
                success: false,
            });
            return Err(error);
        }

        let destination =
            crate::destination::resolve(&job.source_dir, &job.output_root, &job.trim_token);
        let report = TransferReport {
            marker_path: destination.join(&job.marker_name),
            destination,
            purged_previous: false,
            files_copied: 0,
            files_skipped: 0,
            bytes_copied: 0,
            files_removed: 0,
            directories_removed: 0,
            repeat_run: false,
            duration_ms: 0,
        };

        self.transfers.write().await.push(RecordedTransfer { job, success: true });
        Ok(report)
    }
}
