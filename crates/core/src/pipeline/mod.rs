//! Per-invocation acquisition pipeline.
//!
//! Each run handles the one file whose arrival triggered the process: it
//! updates the directory's ledger under the directory lock and, once nothing
//! is pending, hands the sequence to a [`Transferer`](crate::transfer::Transferer).

mod error;
mod runner;
mod types;

pub use error::PipelineError;
pub use runner::AcquisitionPipeline;
pub use types::Outcome;
