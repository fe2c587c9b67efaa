use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Output directory is not empty
/// - Marker and ledger file names are plain, non-empty file names
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.output_directory.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Output_Directory cannot be empty".to_string(),
        ));
    }

    check_file_name("Token_File", &config.token_file)?;
    check_file_name("Ledger_File", &config.ledger_file)?;

    Ok(())
}

fn check_file_name(key: &str, name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{key} cannot be empty"
        )));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(ConfigError::ValidationError(format!(
            "{key} must be a file name, got {name:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_validate_valid_config() {
        let config = load_config_from_str("Output_Directory=/mnt/share").unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_output_directory_fails() {
        let config = load_config_from_str("Output_Directory=").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_token_file_with_separator_fails() {
        let config =
            load_config_from_str("Output_Directory=/mnt/share\nToken_File=sub/Done.txt").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_ledger_file_fails() {
        let config = load_config_from_str("Output_Directory=/mnt/share\nLedger_File=").unwrap();
        assert!(validate_config(&config).is_err());
    }
}
