//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for settings that load but will not
//! behave as written.

use std::fmt;

use crate::{ComparatorKind, Config, MAX_FUZZY_DISTANCE};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Index paths are configured but the binary comparator cannot index.
    IndexIgnored {
        /// The configured index paths.
        paths: Vec<String>,
    },
    /// The fuzzy distance exceeds what the automaton supports.
    MaxDistanceClamped {
        /// Configured distance.
        configured: u8,
        /// Distance actually used.
        used: u8,
    },
    /// A limit of zero prints nothing.
    ZeroLimit,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexIgnored { paths } => write!(
                f,
                "search.index ({}) is ignored by the binary comparator",
                paths.join(", ")
            ),
            Self::MaxDistanceClamped { configured, used } => write!(
                f,
                "fuzzy.max_distance {configured} exceeds the supported maximum; using {used}"
            ),
            Self::ZeroLimit => write!(f, "search.limit is 0; searches will print no results"),
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.search.comparator == ComparatorKind::Binary && !config.search.index.is_empty() {
        warnings.push(ConfigWarning::IndexIgnored {
            paths: config.search.index.clone(),
        });
    }

    if config.fuzzy.max_distance > MAX_FUZZY_DISTANCE {
        warnings.push(ConfigWarning::MaxDistanceClamped {
            configured: config.fuzzy.max_distance,
            used: MAX_FUZZY_DISTANCE,
        });
    }

    if config.search.limit == 0 {
        warnings.push(ConfigWarning::ZeroLimit);
    }

    warnings
}
