//! File system transferer implementation.

use async_trait::async_trait;
use chrono::Local;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info, warn};

use super::error::TransferError;
use super::marker::{is_repeat_run, CompletionMarker};
use super::traits::Transferer;
use super::types::{RemovalPolicy, TransferJob, TransferReport};
use crate::destination;

/// Default copy buffer size (1 MB).
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// One file or directory found while walking a tree.
#[derive(Debug, Clone)]
struct TreeEntry {
    path: PathBuf,
    relative: PathBuf,
    is_dir: bool,
    len: u64,
    modified: Option<SystemTime>,
}

/// Walks `root` depth-first, parents before children, siblings by name.
/// Anything at or below `skip` is left out.
async fn walk(root: &Path, skip: Option<&Path>) -> std::io::Result<Vec<TreeEntry>> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            children.push(entry.path());
        }
        children.sort();

        let mut subdirs = Vec::new();
        for path in children {
            if skip.is_some_and(|s| path.starts_with(s)) {
                continue;
            }
            let meta = fs::metadata(&path).await?;
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            if meta.is_dir() {
                subdirs.push(path.clone());
            }
            found.push(TreeEntry {
                path,
                relative,
                is_dir: meta.is_dir(),
                len: meta.len(),
                modified: meta.modified().ok(),
            });
        }

        // Reverse so the stack pops them in name order.
        stack.extend(subdirs.into_iter().rev());
    }

    Ok(found)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Counts from the copy step.
#[derive(Debug, Default)]
struct CopyStats {
    files_copied: usize,
    files_skipped: usize,
    bytes_copied: u64,
}

/// Counts from the cleanup step.
#[derive(Debug, Default)]
struct CleanupStats {
    files_removed: usize,
    directories_removed: usize,
}

/// File system based transferer implementation.
pub struct FsTransferer {
    buffer_size: usize,
}

impl FsTransferer {
    /// Creates a transferer copying with the given buffer size.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    /// Creates a transferer with the default buffer size.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }

    /// Creates the destination, or deletes and recreates it when it holds
    /// undersized data files from an interrupted transfer. Returns whether a
    /// purge happened.
    async fn prepare_destination(
        &self,
        destination: &Path,
        job: &TransferJob,
    ) -> Result<bool, TransferError> {
        let prepare_err = |source: std::io::Error| TransferError::DestinationPrepare {
            path: destination.to_path_buf(),
            source,
        };

        match fs::metadata(destination).await {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(destination).await.map_err(prepare_err)?;
                debug!(dest = %destination.display(), "Created destination");
                return Ok(false);
            }
            Err(e) => return Err(prepare_err(e)),
            Ok(meta) if !meta.is_dir() => {
                return Err(prepare_err(std::io::Error::other(
                    "destination exists and is not a directory",
                )));
            }
            Ok(_) => {}
        }

        let undersized: Vec<TreeEntry> = walk(destination, None)
            .await
            .map_err(prepare_err)?
            .into_iter()
            .filter(|e| {
                !e.is_dir
                    && has_extension(&e.path, &job.data_file_extension)
                    && e.len < job.min_file_size
            })
            .collect();

        if undersized.is_empty() {
            debug!(dest = %destination.display(), "Destination exists, no undersized data files");
            return Ok(false);
        }

        for entry in &undersized {
            warn!(
                file = %entry.path.display(),
                size = entry.len,
                threshold = job.min_file_size,
                "Undersized data file in destination"
            );
        }
        warn!(
            dest = %destination.display(),
            "Destination looks like an interrupted transfer, deleting it before copying"
        );

        fs::remove_dir_all(destination).await.map_err(prepare_err)?;
        fs::create_dir_all(destination).await.map_err(prepare_err)?;
        Ok(true)
    }

    /// Copies a single file, keeping its modification time.
    async fn copy_file(
        &self,
        source: &Path,
        destination: &Path,
        modified: Option<SystemTime>,
    ) -> Result<u64, TransferError> {
        let copy_err =
            |e| TransferError::copy(source.to_path_buf(), destination.to_path_buf(), e);

        let source_file = File::open(source).await.map_err(copy_err)?;
        let dest_file = File::create(destination).await.map_err(copy_err)?;

        let mut reader = BufReader::with_capacity(self.buffer_size, source_file);
        let mut writer = BufWriter::with_capacity(self.buffer_size, dest_file);

        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let bytes_read = reader.read(&mut buffer).await.map_err(copy_err)?;
            if bytes_read == 0 {
                break;
            }
            writer
                .write_all(&buffer[..bytes_read])
                .await
                .map_err(copy_err)?;
            total_bytes += bytes_read as u64;
        }

        writer.flush().await.map_err(copy_err)?;

        if let Some(modified) = modified {
            let file = writer.into_inner().into_std().await;
            file.set_modified(modified).map_err(copy_err)?;
        }

        Ok(total_bytes)
    }

    /// Copies the source tree into the destination.
    async fn copy_tree(
        &self,
        source_dir: &Path,
        destination: &Path,
        overwrite_older: bool,
    ) -> Result<CopyStats, TransferError> {
        let entries = walk(source_dir, Some(destination)).await.map_err(|e| {
            TransferError::copy(source_dir.to_path_buf(), destination.to_path_buf(), e)
        })?;

        let mut stats = CopyStats::default();

        for entry in entries {
            let target = destination.join(&entry.relative);

            if entry.is_dir {
                fs::create_dir_all(&target)
                    .await
                    .map_err(|e| TransferError::copy(entry.path.clone(), target.clone(), e))?;
                continue;
            }

            match fs::metadata(&target).await {
                Ok(existing) => {
                    let source_newer = match (entry.modified, existing.modified().ok()) {
                        (Some(src), Some(dst)) => src > dst,
                        _ => false,
                    };
                    if !(overwrite_older && source_newer) {
                        debug!(file = %target.display(), "Destination file exists, skipping");
                        stats.files_skipped += 1;
                        continue;
                    }
                    debug!(file = %target.display(), "Replacing older destination file");
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(TransferError::copy(entry.path.clone(), target, e)),
            }

            let bytes = self.copy_file(&entry.path, &target, entry.modified).await?;
            debug!(file = %target.display(), bytes, "Copied");
            stats.files_copied += 1;
            stats.bytes_copied += bytes;
        }

        Ok(stats)
    }

    /// Removes source files and directories according to `policy`.
    async fn cleanup_source(
        &self,
        source_dir: &Path,
        policy: RemovalPolicy,
        manifest_extension: &str,
    ) -> Result<CleanupStats, TransferError> {
        let mut stats = CleanupStats::default();

        if !policy.remove_files {
            debug!(dir = %source_dir.display(), "Source cleanup disabled");
            return Ok(stats);
        }

        let cleanup_err = |path: &Path, source| TransferError::Cleanup {
            path: path.to_path_buf(),
            source,
        };

        let entries = walk(source_dir, None)
            .await
            .map_err(|e| cleanup_err(source_dir, e))?;

        for entry in entries.iter().filter(|e| !e.is_dir) {
            if policy.keeps_manifest() && has_extension(&entry.path, manifest_extension) {
                debug!(file = %entry.path.display(), "Preserving manifest");
                continue;
            }
            fs::remove_file(&entry.path)
                .await
                .map_err(|e| cleanup_err(entry.path.as_path(), e))?;
            stats.files_removed += 1;
        }

        if policy.removes_directories() {
            fs::remove_dir_all(source_dir)
                .await
                .map_err(|e| cleanup_err(source_dir, e))?;
            stats.directories_removed = entries.iter().filter(|e| e.is_dir).count() + 1;
        } else if policy.remove_directories {
            info!(
                dir = %source_dir.display(),
                "Directory removal suppressed because the manifest is preserved"
            );
        }

        Ok(stats)
    }

    async fn run_transfer(&self, job: TransferJob) -> Result<TransferReport, TransferError> {
        let start = Instant::now();

        let destination = destination::resolve(&job.source_dir, &job.output_root, &job.trim_token);
        info!(
            source = %job.source_dir.display(),
            dest = %destination.display(),
            "Transferring completed sequence"
        );

        let purged_previous = self.prepare_destination(&destination, &job).await?;

        let copy = self
            .copy_tree(&job.source_dir, &destination, job.overwrite_older)
            .await?;
        info!(
            copied = copy.files_copied,
            skipped = copy.files_skipped,
            bytes = copy.bytes_copied,
            "Copy finished"
        );

        let cleanup = self
            .cleanup_source(&job.source_dir, job.removal, &job.manifest_extension)
            .await?;

        let repeat_run = is_repeat_run(&job.repeat_run_marker, &destination, &job.trigger_name);
        let marker_path = destination.join(&job.marker_name);
        CompletionMarker::new(Local::now().naive_local(), &job.trigger_name, repeat_run)
            .write_to(&marker_path)
            .map_err(|e| TransferError::MarkerWrite {
                path: marker_path.clone(),
                source: e,
            })?;
        info!(marker = %marker_path.display(), repeat_run, "Completion marker written");

        Ok(TransferReport {
            destination,
            purged_previous,
            files_copied: copy.files_copied,
            files_skipped: copy.files_skipped,
            bytes_copied: copy.bytes_copied,
            files_removed: cleanup.files_removed,
            directories_removed: cleanup.directories_removed,
            marker_path,
            repeat_run,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl Transferer for FsTransferer {
    fn name(&self) -> &str {
        "fs"
    }

    async fn transfer(&self, job: TransferJob) -> Result<TransferReport, TransferError> {
        self.run_transfer(job).await
    }
}
