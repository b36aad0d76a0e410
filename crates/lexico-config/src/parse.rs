//! Configuration file parsing.
//!
//! Parses individual `.lexico.toml` files into `RawConfig` structures that keep every field
//! optional until merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here and ignore parent and global configs.
    pub root: Option<bool>,
    /// Search settings section.
    pub search: Option<RawSearchSettings>,
    /// Fuzzy matching section.
    pub fuzzy: Option<RawFuzzySettings>,
}

/// Raw `[search]` settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Comparator name: `binary` or `fuzzy`.
    pub comparator: Option<String>,
    /// Whether malformed queries are repaired.
    pub error_recovery: Option<bool>,
    /// Score handling between runs: `reset` or `accumulate`.
    pub score_mode: Option<String>,
    /// Maximum results to print.
    pub limit: Option<usize>,
    /// Paths to index. Accepts a single string or an array.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub index: Option<Vec<String>>,
}

/// Raw `[fuzzy]` settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFuzzySettings {
    /// Maximum Levenshtein distance per word.
    pub max_distance: Option<u8>,
    /// Whether a transposition counts as one edit.
    pub transpositions: Option<bool>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string; `path` is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration without path context (tests only).
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
