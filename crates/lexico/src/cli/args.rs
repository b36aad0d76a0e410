//! Clap argument definitions for the `lexico` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "lexico")]
#[command(about = "Query language for filtering and fuzzy-ranking JSON records")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity (-v for debug, -vv for trace); LEXICO_LOG overrides
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Arguments for `lexico search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Query to evaluate
    pub query: String,

    /// JSON file holding an array of records; `-` or omitted reads stdin
    #[arg(short = 'd', long)]
    pub data: Option<PathBuf>,

    /// Rank by similarity instead of filtering
    #[arg(short = 'f', long)]
    pub fuzzy: bool,

    /// Record path to index for fuzzy search (can be specified multiple times)
    #[arg(short = 'i', long = "index")]
    pub index: Vec<String>,

    /// Reject malformed queries instead of repairing them
    #[arg(long)]
    pub strict: bool,

    /// Maximum results to print [default: 20]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `lexico parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query to parse
    pub query: String,

    /// Reject malformed queries instead of repairing them
    #[arg(long)]
    pub strict: bool,

    /// List the tokens instead of the parse tree
    #[arg(long)]
    pub tokens: bool,
}

/// Arguments for `lexico init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.lexico.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `lexico` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a query against JSON records
    #[command(after_help = "\
QUERY SYNTAX:
  term              Field value contains term (case-insensitive)
  term1 term2       Both terms (implicit AND)
  \"some phrase\"     Quoted term, taken verbatim
  !term             Term must NOT match
  term1 OR term2    Either term
  (expr)            Grouping

SCOPES AND COMPARISONS:
  name:term         Search only under the `name` field
  rocket.name:term  Dotted paths reach nested objects
  year:>2010        Numeric comparison (>, >=, <, <=)

EXAMPLES:
  lexico search heavy --data launches.json
  lexico search 'mission_name:heavy !dragon' -d launches.json
  lexico search 'falcn hevy' --fuzzy --index mission_name -d launches.json
  cat launches.json | lexico search 'year:>=2018' --json")]
    Search(SearchCommand),

    /// Show how a query is tokenized and parsed
    Parse(ParseCommand),

    /// Initialize lexico configuration in current directory
    Init(InitCommand),

    /// Show effective configuration settings
    Config,

    /// Validate configuration and report warnings
    Check,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use lexico_config::DEFAULT_SEARCH_LIMIT;

    use super::*;

    /// Gets help text for a subcommand's argument.
    fn get_arg_help(cmd: &clap::Command, subcmd: &str, arg: &str) -> String {
        cmd.get_subcommands()
            .find(|c| c.get_name() == subcmd)
            .and_then(|c| c.get_arguments().find(|a| a.get_id() == arg))
            .and_then(|a| a.get_help().map(|h| h.to_string()))
            .unwrap_or_default()
    }

    /// Catches drift between the config defaults and the help text.
    #[test]
    fn cli_help_defaults_match_constants() {
        let cmd = Cli::command();

        let limit_help = get_arg_help(&cmd, "search", "limit");
        assert!(
            limit_help.contains(&format!("[default: {DEFAULT_SEARCH_LIMIT}]")),
            "search --limit help should contain default {DEFAULT_SEARCH_LIMIT}: {limit_help}"
        );
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["lexico", "parse", "a", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Parse(_)));
    }

    #[test]
    fn search_collects_index_paths() {
        let cli = Cli::try_parse_from([
            "lexico", "search", "q", "--fuzzy", "-i", "name", "--index", "rocket.name",
        ])
        .unwrap();
        let Commands::Search(cmd) = cli.command else {
            panic!("expected search");
        };
        assert!(cmd.fuzzy);
        assert_eq!(cmd.index, vec!["name", "rocket.name"]);
        assert!(cmd.data.is_none());
    }
}
