//! Ledger types and persistence.

use atomicwrites::{AtomicFile, OverwriteBehavior};
use std::fmt;
use std::io::Write;
use std::path::Path;

use super::error::LedgerError;
use crate::manifest::Manifest;

/// Status of one expected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionStatus {
    /// Not seen yet.
    Pending,
    /// The instrument has written the file.
    Acquired,
}

impl AcquisitionStatus {
    /// On-disk spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "no",
            Self::Acquired => "yes",
        }
    }

    /// Parses the on-disk spelling, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "no" => Some(Self::Pending),
            "yes" => Some(Self::Acquired),
            _ => None,
        }
    }
}

impl fmt::Display for AcquisitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered `identifier -> status` record for one source directory.
///
/// Keys are unique and lower-cased. Order carries no meaning beyond keeping the
/// saved file stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<(String, AcquisitionStatus)>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a ledger from `path`.
    ///
    /// A missing file yields an empty ledger so the caller knows to seed it.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => {
                return Err(LedgerError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        Self::parse(&text).map_err(|(line, content)| LedgerError::Malformed {
            path: path.to_path_buf(),
            line,
            content,
        })
    }

    /// Parses ledger text. On failure returns the 1-based line number and its
    /// content.
    pub fn parse(text: &str) -> Result<Self, (usize, String)> {
        let mut ledger = Self::new();

        for (idx, raw) in text.trim_start_matches('\u{feff}').lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            // Statuses never contain '=', identifiers may.
            let (identifier, status) = line
                .rsplit_once('=')
                .and_then(|(id, status)| {
                    let id = id.trim();
                    if id.is_empty() {
                        return None;
                    }
                    AcquisitionStatus::parse(status).map(|s| (id, s))
                })
                .ok_or_else(|| (idx + 1, raw.to_string()))?;

            ledger.upsert(identifier, status);
        }

        Ok(ledger)
    }

    /// Seeds a ledger from a manifest with every entry pending.
    ///
    /// Identifiers for which `is_filtered` returns true are left out entirely
    /// rather than being marked acquired.
    pub fn seed(manifest: &Manifest, is_filtered: impl Fn(&str) -> bool) -> Self {
        let mut ledger = Self::new();
        for identifier in manifest.iter() {
            if is_filtered(identifier) {
                tracing::debug!(identifier, "Excluding control file from ledger");
                continue;
            }
            ledger.upsert(identifier, AcquisitionStatus::Pending);
        }
        ledger
    }

    /// Marks `identifier` as acquired. Lookup ignores case.
    pub fn mark_acquired(&mut self, identifier: &str) -> Result<(), LedgerError> {
        let key = identifier.to_lowercase();
        match self.entries.iter_mut().find(|(id, _)| *id == key) {
            Some((_, status)) => {
                *status = AcquisitionStatus::Acquired;
                Ok(())
            }
            None => Err(LedgerError::NotInManifest { identifier: key }),
        }
    }

    /// Writes the ledger atomically, one `identifier=status` line per entry.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let text = self.to_text();
        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(text.as_bytes()))
            .map_err(|e| LedgerError::Write {
                path: path.to_path_buf(),
                source: match e {
                    atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
                },
            })
    }

    /// Serialized form.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (identifier, status) in &self.entries {
            out.push_str(identifier);
            out.push('=');
            out.push_str(status.as_str());
            out.push('\n');
        }
        out
    }

    /// True iff no entry is pending.
    ///
    /// An empty ledger is vacuously complete; callers must reject empty
    /// ledgers before relying on this.
    pub fn is_complete(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, status)| *status == AcquisitionStatus::Acquired)
    }

    pub fn status(&self, identifier: &str) -> Option<AcquisitionStatus> {
        let key = identifier.to_lowercase();
        self.entries
            .iter()
            .find(|(id, _)| *id == key)
            .map(|(_, status)| *status)
    }

    /// Identifiers still pending, in ledger order.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, status)| *status == AcquisitionStatus::Pending)
            .map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AcquisitionStatus)> {
        self.entries.iter().map(|(id, status)| (id.as_str(), *status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn upsert(&mut self, identifier: &str, status: AcquisitionStatus) {
        let key = identifier.to_lowercase();
        match self.entries.iter_mut().find(|(id, _)| *id == key) {
            Some((_, existing)) => *existing = status,
            None => self.entries.push((key, status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest(ids: &[&str]) -> Manifest {
        Manifest::from_identifiers(ids.iter().copied(), "raw")
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let ledger = Ledger::load(&temp.path().join("missing.txt")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_parse_normalizes_case() {
        let ledger = Ledger::parse("Sample_01=YES\nsample_02=No\n").unwrap();
        assert_eq!(ledger.status("sample_01"), Some(AcquisitionStatus::Acquired));
        assert_eq!(ledger.status("SAMPLE_02"), Some(AcquisitionStatus::Pending));
        assert_eq!(ledger.to_text(), "sample_01=yes\nsample_02=no\n");
    }

    #[test]
    fn test_parse_rejects_bad_status() {
        let err = Ledger::parse("a=yes\nb=maybe\n").unwrap_err();
        assert_eq!(err.0, 2);
        assert_eq!(err.1, "b=maybe");
    }

    #[test]
    fn test_load_reports_malformed_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ledger.txt");
        std::fs::write(&path, "no separator here\n").unwrap();
        let err = Ledger::load(&path).unwrap_err();
        assert!(matches!(err, LedgerError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_seed_excludes_filtered_identifiers() {
        let ledger = Ledger::seed(&manifest(&["S1", "S1_PostBlank", "S2"]), |id| {
            crate::filter::is_control_file(id, "PostBlank", true)
        });
        assert_eq!(ledger.len(), 2);
        assert!(ledger.status("s1_postblank").is_none());
        assert!(ledger.iter().all(|(_, s)| s == AcquisitionStatus::Pending));
    }

    #[test]
    fn test_mark_acquired_unknown_identifier() {
        let mut ledger = Ledger::seed(&manifest(&["a"]), |_| false);
        let err = ledger.mark_acquired("b").unwrap_err();
        assert!(matches!(err, LedgerError::NotInManifest { ref identifier } if identifier == "b"));
    }

    #[test]
    fn test_completion_progresses() {
        let mut ledger = Ledger::seed(&manifest(&["a", "b"]), |_| false);
        assert!(!ledger.is_complete());

        ledger.mark_acquired("A").unwrap();
        assert!(!ledger.is_complete());
        assert_eq!(ledger.pending().collect::<Vec<_>>(), vec!["b"]);

        ledger.mark_acquired("b").unwrap();
        assert!(ledger.is_complete());
        // Stable across repeated calls and repeated marks.
        ledger.mark_acquired("b").unwrap();
        assert!(ledger.is_complete());
        assert!(ledger.is_complete());
    }

    #[test]
    fn test_save_then_load_reproduces_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ledger.txt");

        let mut ledger = Ledger::seed(&manifest(&["zeta", "Alpha", "mid"]), |_| false);
        ledger.mark_acquired("alpha").unwrap();
        ledger.save(&path).unwrap();

        let loaded = Ledger::load(&path).unwrap();
        assert_eq!(loaded, ledger);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "zeta=no\nalpha=yes\nmid=no\n"
        );
    }

    #[test]
    fn test_identifier_containing_equals_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ledger.txt");

        let mut ledger = Ledger::seed(&manifest(&["S=1", "S2"]), |_| false);
        ledger.save(&path).unwrap();
        assert_eq!(Ledger::load(&path).unwrap(), ledger);

        ledger.mark_acquired("s=1").unwrap();
        ledger.save(&path).unwrap();
        let loaded = Ledger::load(&path).unwrap();
        assert_eq!(loaded.status("s=1"), Some(AcquisitionStatus::Acquired));
        assert_eq!(loaded.pending().collect::<Vec<_>>(), vec!["s2"]);
    }
}
