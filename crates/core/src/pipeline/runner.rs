//! Acquisition pipeline implementation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::filter::ControlFilter;
use crate::ledger::{Ledger, LedgerError};
use crate::lock::DirectoryLock;
use crate::manifest::{
    normalize_identifier, DescriptorManifest, ManifestError, ManifestProvider, StaticManifest,
};
use crate::transfer::{TransferJob, Transferer};

use super::error::PipelineError;
use super::types::Outcome;

/// Runs one invocation: ledger update, completion check, transfer.
pub struct AcquisitionPipeline<T: Transferer> {
    config: Config,
    transferer: T,
    sequence_override: Option<Vec<String>>,
}

impl<T: Transferer> AcquisitionPipeline<T> {
    /// Create a new pipeline.
    pub fn new(config: Config, transferer: T) -> Self {
        Self {
            config,
            transferer,
            sequence_override: None,
        }
    }

    /// Seed new ledgers from `identifiers` instead of the sequence descriptor.
    pub fn with_sequence_override(mut self, identifiers: Vec<String>) -> Self {
        self.sequence_override = Some(identifiers);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ledger location for a source directory.
    pub fn ledger_path(&self, source_dir: &Path) -> PathBuf {
        source_dir.join(&self.config.ledger_file)
    }

    fn control_filter(&self) -> ControlFilter {
        ControlFilter::new(
            self.config.control_file_matches.clone(),
            self.config.ignore_control_files,
        )
    }

    fn manifest_provider(&self, source_dir: &Path) -> Box<dyn ManifestProvider> {
        match &self.sequence_override {
            Some(ids) => Box::new(StaticManifest::new(ids, &self.config.data_file_extension)),
            None => Box::new(DescriptorManifest::new(
                source_dir,
                &self.config.sequence_starts_with,
                &self.config.manifest_extension,
                &self.config.data_file_extension,
            )),
        }
    }

    /// Handles the arrival of `trigger`.
    pub async fn run(&self, trigger: &Path) -> Result<Outcome, PipelineError> {
        let not_found = || PipelineError::TriggerNotFound {
            path: trigger.to_path_buf(),
        };

        let trigger = std::path::absolute(trigger).map_err(|_| not_found())?;
        match tokio::fs::metadata(&trigger).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(not_found()),
        }

        let trigger_name = trigger
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(not_found)?;
        let source_dir = trigger
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .ok_or_else(|| PipelineError::NoSourceDirectory {
                path: trigger.clone(),
            })?;

        let filter = self.control_filter();
        if filter.matches(&trigger_name) {
            info!(file = %trigger_name, "Control file, not tracked");
            return Ok(Outcome::ControlFileIgnored { file: trigger_name });
        }

        let identifier = normalize_identifier(&trigger_name, &self.config.data_file_extension);
        debug!(
            file = %trigger_name,
            identifier = %identifier,
            dir = %source_dir.display(),
            "File acquired"
        );

        // Held until the transfer decision, and any transfer, is done.
        let mut lock = DirectoryLock::for_directory(&source_dir)?;
        debug!(lock = %lock.path().display(), "Waiting for directory lock");
        let guard = lock.acquire()?;

        let ledger_path = self.ledger_path(&source_dir);
        let mut ledger = Ledger::load(&ledger_path)?;

        if ledger.is_empty() {
            let provider = self.manifest_provider(&source_dir);
            let manifest = provider.manifest().await?;
            ledger = Ledger::seed(&manifest, |id| filter.matches(id));
            if ledger.is_empty() {
                return Err(ManifestError::Empty {
                    origin: format!(
                        "every entry of the {} manifest is a control file",
                        provider.name()
                    ),
                }
                .into());
            }
            info!(
                dir = %source_dir.display(),
                entries = ledger.len(),
                provider = provider.name(),
                "Seeded acquisition ledger"
            );
        } else if self.sequence_override.is_some() {
            warn!(
                dir = %source_dir.display(),
                "Ledger already exists, sequence override ignored"
            );
        }

        ledger
            .mark_acquired(&identifier)
            .map_err(|e| match e {
                LedgerError::NotInManifest { identifier } => PipelineError::TriggerNotInManifest {
                    identifier,
                    dir: source_dir.clone(),
                },
                other => other.into(),
            })?;
        ledger.save(&ledger_path)?;

        if !ledger.is_complete() {
            let pending: Vec<&str> = ledger.pending().collect();
            info!(
                dir = %source_dir.display(),
                remaining = pending.len(),
                "Sequence incomplete"
            );
            debug!(pending = ?pending, "Outstanding files");
            return Ok(Outcome::Pending {
                remaining: pending.len(),
            });
        }

        info!(dir = %source_dir.display(), trigger = %trigger_name, "Sequence complete");
        let job = TransferJob::from_config(&self.config, &source_dir, trigger_name);
        let report = self.transferer.transfer(job).await?;
        drop(guard);
        lock.discard_if_orphaned(&source_dir);
        Ok(Outcome::Transferred(report))
    }
}
