//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying precedence
//! rules and checking enumerated values.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    ComparatorKind, Config, ConfigError, FuzzySettings, ScoreModeSetting, SearchSettings,
    parse::{RawConfig, RawFuzzySettings, RawSearchSettings},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config). Each scalar takes the first defined value; the
/// `index` list is replaced wholesale rather than concatenated.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let mut search = SearchSettings::default();
    let mut fuzzy = FuzzySettings::default();

    // Lowest precedence first so closer files overwrite
    for parsed in configs.iter().rev() {
        if let Some(ref raw) = parsed.config.search {
            apply_raw_search(&mut search, raw, parsed)?;
        }
        if let Some(ref raw) = parsed.config.fuzzy {
            apply_raw_fuzzy(&mut fuzzy, raw);
        }
    }

    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);

    Ok(Config {
        search,
        fuzzy,
        config_root,
        sources: configs.iter().map(|c| c.path.clone()).collect(),
    })
}

/// Applies raw search settings to result.
fn apply_raw_search(
    result: &mut SearchSettings,
    raw: &RawSearchSettings,
    parsed: &ParsedConfig,
) -> Result<(), ConfigError> {
    if let Some(ref v) = raw.comparator {
        result.comparator =
            parse_choice(v, parsed, "search.comparator", ComparatorKind::EXPECTED)?;
    }
    if let Some(v) = raw.error_recovery {
        result.error_recovery = v;
    }
    if let Some(ref v) = raw.score_mode {
        result.score_mode =
            parse_choice(v, parsed, "search.score_mode", ScoreModeSetting::EXPECTED)?;
    }
    if let Some(v) = raw.limit {
        result.limit = v;
    }
    if let Some(ref v) = raw.index {
        result.index.clone_from(v);
    }
    Ok(())
}

/// Applies raw fuzzy settings to result.
fn apply_raw_fuzzy(result: &mut FuzzySettings, raw: &RawFuzzySettings) {
    if let Some(v) = raw.max_distance {
        result.max_distance = v;
    }
    if let Some(v) = raw.transpositions {
        result.transpositions = v;
    }
}

/// Parses an enumerated string setting, naming the file and key on failure.
fn parse_choice<T: FromStr>(
    value: &str,
    parsed: &ParsedConfig,
    key: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        path: parsed.path.clone(),
        key: key.to_string(),
        value: value.to_string(),
        expected,
    })
}
