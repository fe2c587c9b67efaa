mod key_value;
mod loader;
mod types;
mod validate;

pub use key_value::{parse_key_values, KeyValue};
pub use loader::{load_config, load_config_from_str, ENV_PREFIX};
pub use types::*;
pub use validate::validate_config;

use figment::error::Kind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        match &e.kind {
            Kind::MissingField(field) => Self::MissingKey(field.to_string()),
            _ => Self::ParseError(e.to_string()),
        }
    }
}
