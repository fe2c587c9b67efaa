//! Testing utilities and mock implementations.
//!
//! This module provides a mock transferer and fixture helpers so that the
//! acquisition pipeline can be exercised without copying real data.
//!
//! # Example
//!
//! ```rust,ignore
//! use rawsync_core::testing::{fixtures, MockTransferer};
//!
//! let transferer = MockTransferer::new();
//! let config = fixtures::config("/mnt/out");
//! ```

mod mock_transferer;

pub use mock_transferer::{MockTransferer, RecordedTransfer};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::config::{load_config_from_str, Config};

    /// Configuration with defaults and the given output directory.
    pub fn config(output_directory: impl AsRef<Path>) -> Config {
        config_with(output_directory, "")
    }

    /// Configuration with the given output directory plus extra
    /// `Key=Value` lines.
    pub fn config_with(output_directory: impl AsRef<Path>, extra: &str) -> Config {
        let text = format!(
            "Output_Directory={}\n{}",
            output_directory.as_ref().display(),
            extra
        );
        match load_config_from_str(&text) {
            Ok(config) => config,
            Err(e) => panic!("invalid fixture configuration: {e}"),
        }
    }

    /// Writes `len` bytes of filler to `dir/name`, creating `dir`.
    pub fn write_data_file(dir: &Path, name: &str, len: usize) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(name), vec![0x5a; len])
    }

    /// Writes a sequence descriptor listing `names` under a `File Name`
    /// header.
    pub fn write_descriptor(dir: &Path, file_name: &str, names: &[&str]) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        let mut text = String::from("Bracket Type=4,,\nSample Type,File Name,Sample ID\n");
        for (idx, name) in names.iter().enumerate() {
            text.push_str(&format!("Unknown,{},{}\n", name, idx + 1));
        }
        std::fs::write(dir.join(file_name), text)
    }
}
