//! Error types for lexico configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::de;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A setting has a value outside its accepted set.
    #[error("invalid value '{value}' for {key} in {path}: expected {expected}")]
    InvalidValue {
        /// File the value came from.
        path: PathBuf,
        /// Dotted key, such as `search.comparator`.
        key: String,
        /// The offending value.
        value: String,
        /// Description of accepted values.
        expected: &'static str,
    },
}
