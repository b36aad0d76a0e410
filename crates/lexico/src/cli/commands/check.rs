//! Implementation of `lexico check`.

use std::{path::Path, process::ExitCode};

use lexico_config::{ConfigWarning, discover_config_files};

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, success, warning},
};

/// Lists the configuration files in effect and reports validation warnings.
///
/// Exits with failure when any warning is found.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let cwd = &ctx.cwd;

    let config_files = discover_config_files(cwd);
    if config_files.is_empty() {
        println!("{}", dim("No configuration files found."));
        println!();
        println!(
            "Run {} to create a configuration file.",
            subheader("lexico init")
        );
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader("Config files:"));
    for path in &config_files {
        println!("   {}", display_path(path, cwd));
    }
    println!();

    let search = &ctx.config.search;
    println!("{}", subheader("Search:"));
    println!("   comparator = {}", search.comparator);
    if !search.index.is_empty() {
        println!("   index = {}", search.index.join(", "));
    }
    println!();

    let warnings = ctx.config.validate();
    if warnings.is_empty() {
        println!("{}", success("No issues found."));
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    println!();

    print_hints(&warnings);

    ExitCode::FAILURE
}

/// Shows `path` relative to `base` when it lies beneath it.
fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    for w in warnings {
        match w {
            ConfigWarning::IndexIgnored { .. } => {
                println!(
                    "{}",
                    dim("Hint: set search.comparator = \"fuzzy\" or remove search.index")
                );
            }
            ConfigWarning::MaxDistanceClamped { .. } => {
                println!("{}", dim("Hint: fuzzy.max_distance accepts 0 to 3"));
            }
            ConfigWarning::ZeroLimit => {}
        }
    }
}
