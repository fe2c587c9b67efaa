//! Figment provider for flat `Key=Value` configuration files.

use std::path::PathBuf;

use figment::value::{Dict, Map, Value};
use figment::{Error, Metadata, Profile, Provider};

/// Source of `Key=Value` text.
#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Text(String),
}

/// A [`Provider`] reading `Key=Value` lines.
///
/// Keys are lower-cased so `Output_Directory` and `OUTPUT_DIRECTORY` land on the
/// same field, matching what `Env` produces for overrides. Values are always
/// handed to figment as strings; typed fields parse them on extraction.
#[derive(Debug, Clone)]
pub struct KeyValue {
    source: Source,
}

impl KeyValue {
    /// Reads pairs from a file when the figment is extracted.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
        }
    }

    /// Reads pairs from an in-memory string.
    pub fn string(text: impl Into<String>) -> Self {
        Self {
            source: Source::Text(text.into()),
        }
    }
}

impl Provider for KeyValue {
    fn metadata(&self) -> Metadata {
        match &self.source {
            Source::File(path) => Metadata::named("Key=Value file")
                .source(figment::Source::File(path.clone())),
            Source::Text(_) => Metadata::named("Key=Value string"),
        }
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let dict = match &self.source {
            Source::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    Error::from(format!("failed to read {}: {}", path.display(), e))
                })?;
                parse_key_values(&text)
            }
            Source::Text(text) => parse_key_values(text),
        };

        Ok(Profile::Default.collect(dict))
    }
}

/// Parses `Key=Value` lines into a figment dictionary.
///
/// Blank lines and lines starting with `#` or `;` are skipped, as are lines
/// without `=`. Only the first `=` splits, so values may contain `=`. Matching
/// double quotes around a value are removed. A later duplicate key wins.
pub fn parse_key_values(text: &str) -> Dict {
    let mut dict = Dict::new();

    for line in text.trim_start_matches('\u{feff}').lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            tracing::debug!(line, "Ignoring configuration line without '='");
            continue;
        };

        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            continue;
        }

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);

        dict.insert(key, Value::from(value.to_string()));
    }

    dict
}
