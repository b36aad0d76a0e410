//! Command implementations and dispatch.

pub mod check;
pub mod config;
pub mod init;
pub mod parse;
pub mod search;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext, verbose: u8) -> ExitCode {
    match command {
        Commands::Search(cmd) => search::run(ctx, &cmd, verbose),
        Commands::Parse(cmd) => parse::run(ctx, &cmd),
        Commands::Init(cmd) => init::run(ctx, &cmd),
        Commands::Config => config::run(ctx),
        Commands::Check => check::run(ctx),
    }
}
