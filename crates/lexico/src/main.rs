//! Command-line interface for the `lexico` query tool.

use std::process::ExitCode;

use clap::Parser;
use lexico::cli::{
    CommandContext,
    args::{Cli, Commands},
    commands, logging,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let ctx = match cli.command {
        Commands::Init(_) => CommandContext::load_cwd_only(),
        _ => CommandContext::load(),
    };
    let ctx = match ctx {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    commands::run(cli.command, &ctx, cli.verbose)
}
