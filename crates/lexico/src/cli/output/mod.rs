//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use lexico_engine::Hit;
pub use lexico_highlight::{dim, header, subheader, success, warning};
use serde::Serialize;

/// Widest a record is rendered in the results table before truncation.
const MAX_RECORD_WIDTH: usize = 80;

/// JSON output for `lexico search`.
#[derive(Serialize)]
struct JsonSearchOutput<'a> {
    /// The query as typed.
    query: &'a str,
    /// The query as parsed, after any repair.
    parsed: &'a str,
    /// Name of the comparator that produced the scores.
    comparator: &'a str,
    /// Hits before the limit was applied.
    total_matches: usize,
    /// Ranked hits, limited.
    results: &'a [Hit],
}

/// What a search produced, ready for printing.
pub struct SearchReport<'a> {
    /// The query as typed.
    pub query: &'a str,
    /// The query as parsed.
    pub parsed: &'a str,
    /// Comparator name.
    pub comparator: &'a str,
    /// All hits in rank order.
    pub hits: &'a [Hit],
    /// Maximum hits to print.
    pub limit: usize,
}

impl SearchReport<'_> {
    /// Hits that fit under the limit.
    fn shown(&self) -> &[Hit] {
        &self.hits[..self.hits.len().min(self.limit)]
    }
}

/// Prints search results as a table, or as JSON with `json`.
pub fn output_search_results(report: &SearchReport<'_>, json: bool, verbose: u8) -> ExitCode {
    if json {
        let output = JsonSearchOutput {
            query: report.query,
            parsed: report.parsed,
            comparator: report.comparator,
            total_matches: report.hits.len(),
            results: report.shown(),
        };
        return match serde_json::to_string_pretty(&output) {
            Ok(json_str) => {
                println!("{json_str}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to serialize JSON: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if verbose > 0 {
        println!("{} {}", subheader("Query:"), report.parsed);
    }

    if report.hits.is_empty() {
        println!("{}", dim("No results found."));
        return ExitCode::SUCCESS;
    }

    let shown = report.shown();
    println!("{}", hits_table(shown, report.comparator == "fuzzy"));

    let summary = if shown.len() < report.hits.len() {
        format!("{} of {} results", shown.len(), report.hits.len())
    } else {
        format!("{} results", report.hits.len())
    };
    println!("{}", dim(&format!("─── {summary} ({}) ───", report.comparator)));

    ExitCode::SUCCESS
}

/// Builds the results table; the score column only appears for ranking comparators.
fn hits_table(hits: &[Hit], with_scores: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    if with_scores {
        table.set_header(vec!["#", "Score", "Record"]);
    } else {
        table.set_header(vec!["#", "Record"]);
    }

    for hit in hits {
        let mut row = vec![Cell::new(hit.position).set_alignment(CellAlignment::Right)];
        if with_scores {
            row.push(Cell::new(format_score(hit.score)).set_alignment(CellAlignment::Right));
        }
        row.push(Cell::new(truncate(&hit.record.to_string(), MAX_RECORD_WIDTH)));
        table.add_row(row);
    }

    table
}

/// Formats a score with two decimals.
pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}

/// Shortens `text` to at most `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
