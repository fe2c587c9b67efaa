//! Completion marker written into the destination after a transfer.
//!
//! Downstream consumers watch for this file, so it is written last and
//! atomically. It has exactly three lines:
//!
//! ```text
//! 2026-10-18 14:03:27
//! raw_file="Sample_12.raw"
//! repeat_run="false"
//! ```

use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::Path;

/// Timestamp format of the first line (19 characters).
pub const MARKER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns true when `marker` occurs, ignoring case, in the destination path
/// or the triggering file name. An empty marker never matches.
pub fn is_repeat_run(marker: &str, destination: &Path, trigger_name: &str) -> bool {
    if marker.is_empty() {
        return false;
    }
    let marker = marker.to_lowercase();
    destination
        .to_string_lossy()
        .to_lowercase()
        .contains(&marker)
        || trigger_name.to_lowercase().contains(&marker)
}

/// Contents of the completion marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMarker {
    pub timestamp: NaiveDateTime,
    pub raw_file: String,
    pub repeat_run: bool,
}

impl CompletionMarker {
    pub fn new(timestamp: NaiveDateTime, raw_file: impl Into<String>, repeat_run: bool) -> Self {
        Self {
            timestamp,
            raw_file: raw_file.into(),
            repeat_run,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{}\nraw_file=\"{}\"\nrepeat_run=\"{}\"\n",
            self.timestamp.format(MARKER_TIMESTAMP_FORMAT),
            self.raw_file,
            self.repeat_run
        )
    }

    /// Writes the marker to `path`, replacing any earlier one atomically.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let text = self.render();
        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(text.as_bytes()))
            .map_err(|e| match e {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
            })
    }
}
