//! Shared context for running CLI commands.

use std::{
    env, fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use lexico_config::{ComparatorKind, Config, ScoreModeSetting};
use lexico_engine::{
    BinaryComparator, Engine, EngineBuilder, FuzzyComparator, Record, ScoreMode, Similarity,
};
use serde_json::Value;
use tracing::debug;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which should work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Whether queries are repaired, given a `--strict` flag.
    pub fn recovery(&self, strict: bool) -> bool {
        self.config.search.error_recovery && !strict
    }

    /// Builds an engine from configuration and command-line overrides.
    ///
    /// Configured index paths are only applied to the fuzzy comparator; paths passed on the
    /// command line are always applied so that asking the binary comparator to index fails.
    pub fn engine(&self, overrides: &EngineOverrides<'_>) -> Engine {
        let settings = &self.config.search;
        let kind = if overrides.fuzzy {
            ComparatorKind::Fuzzy
        } else {
            settings.comparator
        };

        let builder = Engine::builder()
            .recovery(self.recovery(overrides.strict))
            .score_mode(match settings.score_mode {
                ScoreModeSetting::Reset => ScoreMode::Reset,
                ScoreModeSetting::Accumulate => ScoreMode::Accumulate,
            });
        let builder = with_comparator(builder, kind, &self.config);

        let index: &[String] = if !overrides.index.is_empty() {
            overrides.index
        } else if kind == ComparatorKind::Fuzzy {
            &settings.index
        } else {
            &[]
        };

        debug!(comparator = %kind, ?index, "building engine");
        builder.index_fields(index.iter().cloned()).build()
    }

    /// Reads a JSON array of records from `source`, or stdin when absent or `-`.
    ///
    /// Relative paths resolve against the context's working directory.
    pub fn read_records(&self, source: Option<&Path>) -> Result<Vec<Record>, ExitCode> {
        let (label, contents) = match source {
            Some(path) if path != Path::new("-") => {
                let path = self.cwd.join(path);
                let contents = fs::read_to_string(&path).map_err(|e| {
                    eprintln!("error: failed to read {}: {e}", path.display());
                    ExitCode::FAILURE
                })?;
                (path.display().to_string(), contents)
            }
            _ => {
                let mut contents = String::new();
                io::stdin().read_to_string(&mut contents).map_err(|e| {
                    eprintln!("error: failed to read stdin: {e}");
                    ExitCode::FAILURE
                })?;
                ("stdin".to_string(), contents)
            }
        };

        parse_records(&contents).map_err(|message| {
            eprintln!("error: {label}: {message}");
            ExitCode::FAILURE
        })
    }
}

/// Command-line settings that take precedence over configuration.
#[derive(Debug, Default)]
pub struct EngineOverrides<'a> {
    /// Force the fuzzy comparator.
    pub fuzzy: bool,
    /// Disable error recovery.
    pub strict: bool,
    /// Index paths; replaces the configured list when non-empty.
    pub index: &'a [String],
}

/// Installs the configured comparator on `builder`.
fn with_comparator(
    builder: EngineBuilder,
    kind: ComparatorKind,
    config: &Config,
) -> EngineBuilder {
    match kind {
        ComparatorKind::Binary => builder.comparator(BinaryComparator),
        ComparatorKind::Fuzzy => {
            let fuzzy = &config.fuzzy;
            let similarity = Similarity::new(fuzzy.max_distance, fuzzy.transpositions);
            builder.comparator(FuzzyComparator::new(similarity))
        }
    }
}

/// Parses a JSON array of records.
fn parse_records(contents: &str) -> Result<Vec<Record>, String> {
    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Array(records)) => Ok(records),
        Ok(_) => Err("expected a JSON array of records".to_string()),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
