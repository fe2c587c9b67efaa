//! Manifest provider backed by the sequence descriptor in the source directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::ManifestError;
use super::traits::ManifestProvider;
use super::types::Manifest;

/// Header of the column holding the acquisition file names.
const FILE_NAME_COLUMN: &str = "File Name";

/// Reads the expected identifiers from the sequence descriptor.
///
/// The descriptor is the first file in the source directory, by name, whose
/// extension matches and whose name starts with the configured prefix. The
/// instrument's binary sequence format is not read; the descriptor must be its
/// comma-separated text export.
#[derive(Debug, Clone)]
pub struct DescriptorManifest {
    dir: PathBuf,
    name_prefix: String,
    extension: String,
    data_extension: String,
}

impl DescriptorManifest {
    pub fn new(
        dir: impl Into<PathBuf>,
        name_prefix: impl Into<String>,
        extension: impl Into<String>,
        data_extension: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            name_prefix: name_prefix.into(),
            extension: extension.into(),
            data_extension: data_extension.into(),
        }
    }

    fn unavailable(&self, reason: impl Into<String>) -> ManifestError {
        ManifestError::Unavailable {
            dir: self.dir.clone(),
            reason: reason.into(),
        }
    }

    fn is_descriptor(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let ext_matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension));

        ext_matches
            && name
                .to_lowercase()
                .starts_with(&self.name_prefix.to_lowercase())
    }

    /// Finds the descriptor file in the source directory.
    pub async fn locate(&self) -> Result<PathBuf, ManifestError> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| self.unavailable(format!("cannot list directory: {e}")))?;

        let mut candidates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.unavailable(format!("cannot list directory: {e}")))?
        {
            let path = entry.path();
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if is_file && self.is_descriptor(&path) {
                candidates.push(path);
            }
        }

        candidates.sort();
        if candidates.len() > 1 {
            tracing::warn!(
                dir = %self.dir.display(),
                count = candidates.len(),
                "Multiple sequence descriptors found, using the first by name"
            );
        }

        candidates.into_iter().next().ok_or_else(|| {
            self.unavailable(format!(
                "no *.{} descriptor starting with {:?}",
                self.extension, self.name_prefix
            ))
        })
    }
}

#[async_trait]
impl ManifestProvider for DescriptorManifest {
    fn name(&self) -> &str {
        "descriptor"
    }

    async fn manifest(&self) -> Result<Manifest, ManifestError> {
        let path = self.locate().await?;
        let bytes = fs::read(&path)
            .await
            .map_err(|e| self.unavailable(format!("cannot read {}: {e}", path.display())))?;
        let text = String::from_utf8_lossy(&bytes);

        let manifest = Manifest::from_identifiers(parse_descriptor(&text), &self.data_extension);
        tracing::debug!(
            descriptor = %path.display(),
            entries = manifest.len(),
            "Read sequence descriptor"
        );

        if manifest.is_empty() {
            return Err(ManifestError::Empty {
                origin: path.display().to_string(),
            });
        }
        Ok(manifest)
    }
}

/// Extracts acquisition file names from descriptor text.
///
/// With a header row containing a `File Name` column, that column of every
/// following row is returned. Without one, every non-empty line is an entry.
pub fn parse_descriptor(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let header = lines.iter().enumerate().find_map(|(idx, line)| {
        split_row(line)
            .iter()
            .position(|cell| cell.eq_ignore_ascii_case(FILE_NAME_COLUMN))
            .map(|column| (idx, column))
    });

    match header {
        Some((header_idx, column)) => lines[header_idx + 1..]
            .iter()
            .filter_map(|line| split_row(line).into_iter().nth(column))
            .filter(|cell| !cell.is_empty())
            .collect(),
        None => lines.into_iter().map(str::to_string).collect(),
    }
}

/// Splits one comma-separated row, honoring double-quoted cells.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXPORT: &str = "\
Bracket Type=4,,,
Sample Type,File Name,Sample ID,Path
Unknown,QC_Std_01,1,D:\\Transfer\\Run
Blank,QC_PostBlank_01,2,D:\\Transfer\\Run
Unknown,\"Sample, 03\",3,D:\\Transfer\\Run
Unknown,,4,D:\\Transfer\\Run
";

    #[test]
    fn test_parse_export_with_header() {
        let names = parse_descriptor(EXPORT);
        assert_eq!(names, vec!["QC_Std_01", "QC_PostBlank_01", "Sample, 03"]);
    }

    #[test]
    fn test_parse_plain_list() {
        let names = parse_descriptor("\nrun_a.raw\n  run_b\n\n");
        assert_eq!(names, vec!["run_a.raw", "run_b"]);
    }

    #[test]
    fn test_split_row_escaped_quotes() {
        assert_eq!(split_row(r#"a,"b ""x"" c",d"#), vec!["a", "b \"x\" c", "d"]);
    }

    #[tokio::test]
    async fn test_locate_filters_by_prefix_and_extension() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("Other.csv"), "x").unwrap();
        std::fs::write(temp.path().join("Seq_B.csv"), "x").unwrap();
        std::fs::write(temp.path().join("Seq_A.CSV"), "x").unwrap();
        std::fs::write(temp.path().join("Seq_C.txt"), "x").unwrap();

        let provider = DescriptorManifest::new(temp.path(), "seq", "csv", "raw");
        let found = provider.locate().await.unwrap();
        assert_eq!(found.file_name().unwrap(), "Seq_A.CSV");
    }

    #[tokio::test]
    async fn test_manifest_from_descriptor() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("Sequence.csv"), EXPORT).unwrap();

        let provider = DescriptorManifest::new(temp.path(), "", "csv", "raw");
        let manifest = provider.manifest().await.unwrap();
        assert_eq!(
            manifest.iter().collect::<Vec<_>>(),
            vec!["qc_std_01", "qc_postblank_01", "sample, 03"]
        );
    }

    #[tokio::test]
    async fn test_missing_descriptor_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let provider = DescriptorManifest::new(temp.path(), "", "csv", "raw");
        let err = provider.manifest().await.unwrap_err();
        assert!(matches!(err, ManifestError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_header_only_descriptor_is_empty() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("Sequence.csv"), "Sample Type,File Name\n").unwrap();
        let provider = DescriptorManifest::new(temp.path(), "", "csv", "raw");
        let err = provider.manifest().await.unwrap_err();
        assert!(matches!(err, ManifestError::Empty { .. }));
    }
}
