//! Implementation of `lexico search`.

use std::process::ExitCode;

use crate::cli::{
    args::SearchCommand,
    context::{CommandContext, EngineOverrides},
    output::{SearchReport, output_search_results},
};

/// Evaluates a query against a JSON record array and prints the ranked hits.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand, verbose: u8) -> ExitCode {
    let records = match ctx.read_records(cmd.data.as_deref()) {
        Ok(records) => records,
        Err(code) => return code,
    };

    let mut engine = ctx.engine(&EngineOverrides {
        fuzzy: cmd.fuzzy,
        strict: cmd.strict,
        index: &cmd.index,
    });

    let compiled = match engine.compile(&cmd.query) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let hits = match engine.run(&compiled, Some(&records)) {
        Ok(hits) => hits,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let parsed = compiled.tree().to_query_string();
    let report = SearchReport {
        query: &cmd.query,
        parsed: &parsed,
        comparator: engine.comparator_name(),
        hits: &hits,
        limit: cmd.limit.unwrap_or(ctx.config.search.limit),
    };
    output_search_results(&report, cmd.json, verbose)
}
