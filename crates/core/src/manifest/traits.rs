//! Trait definitions for the manifest module.

use async_trait::async_trait;

use super::error::ManifestError;
use super::types::Manifest;

/// Source of the expected identifiers for a sequence.
#[async_trait]
pub trait ManifestProvider: Send + Sync {
    /// Returns the name of this provider implementation.
    fn name(&self) -> &str;

    /// Produces the manifest. An empty result is reported as
    /// [`ManifestError::Empty`], never as `Ok`.
    async fn manifest(&self) -> Result<Manifest, ManifestError>;
}
