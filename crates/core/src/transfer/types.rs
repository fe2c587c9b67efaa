//! Types for the transfer module.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::Config;

/// What to remove from the source once it has been copied.
///
/// The three flags are independent, but they combine as follows:
/// nothing is removed unless `remove_files` is set; manifest descriptors
/// survive when `preserve_manifest` is set; directories are only removed when
/// `remove_directories` is set and `preserve_manifest` is not, since removing
/// them would also remove the preserved descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalPolicy {
    pub remove_files: bool,
    pub remove_directories: bool,
    pub preserve_manifest: bool,
}

impl RemovalPolicy {
    /// Whether manifest descriptors are kept when files are removed.
    pub fn keeps_manifest(&self) -> bool {
        self.preserve_manifest
    }

    /// Whether directories, including the source directory itself, go.
    pub fn removes_directories(&self) -> bool {
        self.remove_files && self.remove_directories && !self.preserve_manifest
    }
}

/// A sequence transfer request.
#[derive(Debug, Clone)]
pub struct TransferJob {
    /// Directory holding the completed sequence.
    pub source_dir: PathBuf,
    /// Destination root the source is mapped under.
    pub output_root: PathBuf,
    /// Path fragment trimmed when mapping; empty disables trimming.
    pub trim_token: String,
    /// Name of the file whose arrival completed the sequence.
    pub trigger_name: String,
    /// Replace existing destination files when the source is newer.
    pub overwrite_older: bool,
    pub removal: RemovalPolicy,
    /// Extension (no dot) of data files checked by the retransfer heuristic.
    pub data_file_extension: String,
    /// Extension (no dot) of manifest descriptors.
    pub manifest_extension: String,
    /// Data files below this size mark an interrupted earlier transfer.
    pub min_file_size: u64,
    /// Completion marker file name.
    pub marker_name: String,
    /// Substring flagging a repeat run.
    pub repeat_run_marker: String,
}

impl TransferJob {
    /// Builds a job from configuration for one source directory.
    pub fn from_config(
        config: &Config,
        source_dir: impl Into<PathBuf>,
        trigger_name: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_root: config.output_directory.clone(),
            trim_token: config.source_trim.clone(),
            trigger_name: trigger_name.into(),
            overwrite_older: config.overwrite_older,
            removal: RemovalPolicy {
                remove_files: config.remove_files,
                remove_directories: config.remove_directories,
                preserve_manifest: config.preserve_manifest,
            },
            data_file_extension: config.data_file_extension.clone(),
            manifest_extension: config.manifest_extension.clone(),
            min_file_size: config.min_file_size_to_retransfer,
            marker_name: config.token_file.clone(),
            repeat_run_marker: config.repeat_run_matches.clone(),
        }
    }
}

/// Result of a successful transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    /// Resolved destination directory.
    pub destination: PathBuf,
    /// Whether an existing destination was deleted as an interrupted transfer.
    pub purged_previous: bool,
    pub files_copied: usize,
    /// Existing destination files left as they were.
    pub files_skipped: usize,
    pub bytes_copied: u64,
    pub files_removed: usize,
    pub directories_removed: usize,
    pub marker_path: PathBuf,
    pub repeat_run: bool,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}
