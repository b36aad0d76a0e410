//! Configuration system for lexico.
//!
//! lexico uses TOML configuration files named `.lexico.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.lexico.toml` files found, then loading `~/.lexico.toml` as the global config with lowest
//! precedence.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawFuzzySettings, RawSearchSettings, parse_config_file, parse_config_str,
};
use serde::{Deserialize, Serialize};
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Default number of results printed by `lexico search`.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Default maximum Levenshtein distance per word.
pub const DEFAULT_MAX_DISTANCE: u8 = 2;

/// Largest Levenshtein distance the fuzzy comparator supports.
pub const MAX_FUZZY_DISTANCE: u8 = 3;

/// Top-level merged configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Search settings.
    pub search: SearchSettings,
    /// Fuzzy comparator settings.
    pub fuzzy: FuzzySettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
    /// Files that contributed, highest precedence first.
    pub sources: Vec<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.lexico.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from config file paths given highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML, in the same shape as a `.lexico.toml` file.
    pub fn settings_to_toml(&self) -> String {
        let serializable = SerializableSettings {
            search: &self.search,
            fuzzy: &self.fuzzy,
        };
        toml::to_string_pretty(&serializable).expect("settings serialization should not fail")
    }
}

/// Comparator selected for searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparatorKind {
    /// Exact, case-insensitive substring filtering.
    #[default]
    Binary,
    /// Ranking by edit-distance similarity.
    Fuzzy,
}

impl ComparatorKind {
    /// Accepted spellings, for error messages.
    pub const EXPECTED: &'static str = "\"binary\" or \"fuzzy\"";

    /// Name as written in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl FromStr for ComparatorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "fuzzy" => Ok(Self::Fuzzy),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ComparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score handling between runs over a long-lived dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreModeSetting {
    /// Every run starts from zero.
    #[default]
    Reset,
    /// Scores carry over between runs.
    Accumulate,
}

impl ScoreModeSetting {
    /// Accepted spellings, for error messages.
    pub const EXPECTED: &'static str = "\"reset\" or \"accumulate\"";
}

impl FromStr for ScoreModeSetting {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "accumulate" => Ok(Self::Accumulate),
            _ => Err(()),
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Comparator used by `lexico search`.
    pub comparator: ComparatorKind,
    /// Whether malformed queries are repaired instead of rejected.
    pub error_recovery: bool,
    /// Score handling between runs.
    pub score_mode: ScoreModeSetting,
    /// Maximum results to print.
    pub limit: usize,
    /// Paths to index for fuzzy search.
    pub index: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            comparator: ComparatorKind::Binary,
            error_recovery: true,
            score_mode: ScoreModeSetting::Reset,
            limit: DEFAULT_SEARCH_LIMIT,
            index: Vec::new(),
        }
    }
}

/// Fuzzy comparator settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FuzzySettings {
    /// Maximum Levenshtein distance per word.
    pub max_distance: u8,
    /// Whether a transposition counts as one edit.
    pub transpositions: bool,
}

impl Default for FuzzySettings {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            transpositions: true,
        }
    }
}

/// Borrowed view of the settings for TOML output.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Search settings.
    search: &'a SearchSettings,
    /// Fuzzy comparator settings.
    fuzzy: &'a FuzzySettings,
}
