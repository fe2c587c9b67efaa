use figment::{providers::Env, Figment};
use std::path::Path;

use super::key_value::KeyValue;
use super::{types::Config, ConfigError};

/// Prefix for environment variable overrides, e.g. `RAWSYNC_DEBUG=true`.
pub const ENV_PREFIX: &str = "RAWSYNC_";

/// Load configuration from a `Key=Value` file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(KeyValue::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
        .extract()?;

    Ok(config)
}

/// Load configuration from `Key=Value` text (useful for testing)
pub fn load_config_from_str(text: &str) -> Result<Config, ConfigError> {
    let config: Config = Figment::new().merge(KeyValue::string(text)).extract()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str("Output_Directory=Z:\\Transfer\nSource_Trim=Data").unwrap();
        assert_eq!(config.source_trim, "Data");
        assert_eq!(config.output_directory.to_string_lossy(), "Z:\\Transfer");
    }

    #[test]
    fn test_load_config_from_str_missing_output_directory() {
        let result = load_config_from_str("Source_Trim=Transfer\n");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(ref key) if key == "output_directory"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/rawsync.conf"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            "# instrument PC settings\nOutput_Directory=/mnt/archive\nToken_File=Done.txt\nIgnore_Control_Files=false"
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.output_directory.to_string_lossy(), "/mnt/archive");
        assert_eq!(config.token_file, "Done.txt");
        assert!(!config.ignore_control_files);
    }
}
