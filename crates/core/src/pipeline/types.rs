//! Types for the pipeline module.

use std::fmt;

use serde::Serialize;

use crate::transfer::TransferReport;

/// Successful result of one invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The trigger was a control file; the ledger was not touched.
    ControlFileIgnored { file: String },
    /// The ledger was updated and files are still outstanding.
    Pending { remaining: usize },
    /// The sequence was complete and has been transferred.
    Transferred(TransferReport),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlFileIgnored { file } => write!(f, "ignored control file {file}"),
            Self::Pending { remaining } => write!(f, "{remaining} file(s) still pending"),
            Self::Transferred(report) => write!(
                f,
                "sequence transferred to {} ({} copied, {} skipped)",
                report.destination.display(),
                report.files_copied,
                report.files_skipped
            ),
        }
    }
}
