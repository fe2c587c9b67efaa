//! Sequence manifest providers.
//!
//! A manifest is the ordered set of file identifiers a sequence is expected to
//! produce. It comes either from the sequence descriptor the instrument
//! software leaves in the source directory, or from an explicit override list.

mod descriptor;
mod error;
mod traits;
mod types;

pub use descriptor::{parse_descriptor, DescriptorManifest};
pub use error::ManifestError;
pub use traits::ManifestProvider;
pub use types::{normalize_identifier, Manifest, StaticManifest};
