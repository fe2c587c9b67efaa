//! Types for the manifest module.

use async_trait::async_trait;

use super::error::ManifestError;
use super::traits::ManifestProvider;

/// Normalizes a file name or path into a ledger identifier.
///
/// Takes the last path component (either separator style), drops a trailing
/// `.<data_extension>` and lower-cases the rest.
pub fn normalize_identifier(name: &str, data_extension: &str) -> String {
    let base = name
        .trim()
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or_default()
        .trim();

    let stem = if data_extension.is_empty() {
        base
    } else {
        let suffix_len = data_extension.len() + 1;
        match base.len().checked_sub(suffix_len) {
            Some(cut)
                if base.is_char_boundary(cut)
                    && base[cut..].starts_with('.')
                    && base[cut + 1..].eq_ignore_ascii_case(data_extension) =>
            {
                &base[..cut]
            }
            _ => base,
        }
    };

    stem.to_lowercase()
}

/// Ordered, de-duplicated identifiers expected for one sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    identifiers: Vec<String>,
}

impl Manifest {
    /// Builds a manifest from raw names, normalizing each one. Blank names
    /// and repeats are dropped.
    pub fn from_identifiers<I, S>(names: I, data_extension: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut identifiers: Vec<String> = Vec::new();
        for name in names {
            let id = normalize_identifier(name.as_ref(), data_extension);
            if !id.is_empty() && !identifiers.contains(&id) {
                identifiers.push(id);
            }
        }
        Self { identifiers }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        let key = identifier.to_lowercase();
        self.identifiers.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// Manifest given explicitly, bypassing the descriptor.
#[derive(Debug, Clone)]
pub struct StaticManifest {
    names: Vec<String>,
    data_extension: String,
}

impl StaticManifest {
    /// Entries may themselves hold comma-separated lists.
    pub fn new<I, S>(names: I, data_extension: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .flat_map(|n| {
                n.as_ref()
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            names,
            data_extension: data_extension.into(),
        }
    }
}

#[async_trait]
impl ManifestProvider for StaticManifest {
    fn name(&self) -> &str {
        "override"
    }

    async fn manifest(&self) -> Result<Manifest, ManifestError> {
        let manifest = Manifest::from_identifiers(&self.names, &self.data_extension);
        if manifest.is_empty() {
            return Err(ManifestError::Empty {
                origin: "sequence override list".to_string(),
            });
        }
        Ok(manifest)
    }
}
