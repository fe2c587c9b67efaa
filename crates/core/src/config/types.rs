use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolved per-invocation configuration.
///
/// Field names are the lower-cased configuration keys, so `Output_Directory`
/// in the file maps to `output_directory`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Transfer destination root.
    pub output_directory: PathBuf,

    /// Path fragment trimmed from the source directory when building the
    /// destination. Empty disables rewriting.
    #[serde(default = "default_source_trim")]
    pub source_trim: String,

    /// Substring that marks a repeat run.
    #[serde(default = "default_repeat_run_matches")]
    pub repeat_run_matches: String,

    /// Name of the completion marker written into the destination.
    #[serde(default = "default_token_file")]
    pub token_file: String,

    /// Prefix a sequence descriptor's file name must start with.
    #[serde(default)]
    pub sequence_starts_with: String,

    #[serde(default = "default_true", deserialize_with = "de_bool")]
    pub ignore_control_files: bool,

    #[serde(default = "default_control_file_matches")]
    pub control_file_matches: String,

    #[serde(default, deserialize_with = "de_bool")]
    pub remove_files: bool,

    #[serde(default, deserialize_with = "de_bool")]
    pub remove_directories: bool,

    #[serde(default = "default_true", deserialize_with = "de_bool")]
    pub preserve_manifest: bool,

    #[serde(default, deserialize_with = "de_bool")]
    pub overwrite_older: bool,

    /// Data files smaller than this (bytes) in an existing destination are
    /// taken as evidence of an interrupted transfer.
    #[serde(default = "default_min_file_size", deserialize_with = "de_u64")]
    pub min_file_size_to_retransfer: u64,

    #[serde(default, deserialize_with = "de_bool")]
    pub debug: bool,

    /// Extension of instrument data files, without the dot.
    #[serde(default = "default_data_file_extension")]
    pub data_file_extension: String,

    /// Extension of sequence descriptor files, without the dot.
    #[serde(default = "default_manifest_extension")]
    pub manifest_extension: String,

    /// Ledger file name inside the source directory.
    #[serde(default = "default_ledger_file")]
    pub ledger_file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

fn default_source_trim() -> String {
    "Transfer".to_string()
}

fn default_repeat_run_matches() -> String {
    "_RPT".to_string()
}

fn default_token_file() -> String {
    "MSAComplete.txt".to_string()
}

fn default_control_file_matches() -> String {
    "PostBlank".to_string()
}

fn default_min_file_size() -> u64 {
    100_000
}

fn default_data_file_extension() -> String {
    "raw".to_string()
}

fn default_manifest_extension() -> String {
    "csv".to_string()
}

fn default_ledger_file() -> String {
    "AcquisitionLedger.txt".to_string()
}

fn default_true() -> bool {
    true
}

// The key=value provider hands every value over as a string while `Env`
// overrides arrive already typed, so both forms are accepted.

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumLike {
    Num(u64),
    Text(String),
}

fn de_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(b) => Ok(b),
        BoolLike::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            other => Err(de::Error::custom(format!(
                "invalid boolean value `{other}`"
            ))),
        },
    }
}

fn de_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match NumLike::deserialize(deserializer)? {
        NumLike::Num(n) => Ok(n),
        NumLike::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid integer value `{s}`"))),
    }
}
