//! Implementation of `lexico parse`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use lexico_highlight::{error_pointer, highlight_query, highlight_tokens, indent_content};
use lexico_query::{Lexer, ParseOptions, Token, compile};

use crate::cli::{
    args::ParseCommand,
    context::CommandContext,
    output::{dim, subheader},
};

/// Prints how a query is tokenized and parsed, or why it is rejected.
pub fn run(ctx: &CommandContext, cmd: &ParseCommand) -> ExitCode {
    if cmd.tokens {
        let tokens: Vec<Token> = Lexer::new(&cmd.query).collect();
        print_tokens(&tokens);
        return ExitCode::SUCCESS;
    }

    let options = ParseOptions {
        recovery: ctx.recovery(cmd.strict),
    };

    let tree = match compile(&cmd.query, options) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("error: {}", e.error);
            eprintln!("{}", indent_content(&error_pointer(&e.query, e.position())));
            if let Some(hint) = e.suggestion() {
                eprintln!("{}", dim(&format!("hint: {hint}")));
            }
            return ExitCode::FAILURE;
        }
    };

    println!("{}", subheader("Query:"));
    println!("   {}", highlight_query(&cmd.query));
    println!();

    println!("{}", subheader("Parsed as:"));
    if tree.leaves().is_empty() {
        println!("   {}", dim("(empty query)"));
    } else {
        println!("   {}", highlight_tokens(tree.leaves()));
    }
    println!();

    println!("{}", subheader("Parse tree:"));
    for line in tree.to_string().lines() {
        println!("   {line}");
    }

    ExitCode::SUCCESS
}

/// Prints a table of tokens with their byte positions.
fn print_tokens(tokens: &[Token]) {
    if tokens.is_empty() {
        println!("{}", dim("(no tokens)"));
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Pos", "Kind", "Value"]);
    for token in tokens {
        table.add_row(vec![
            Cell::new(token.position),
            Cell::new(format!("{:?}", token.kind)),
            Cell::new(token.lexeme()),
        ]);
    }
    println!("{table}");
}
