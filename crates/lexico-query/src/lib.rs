//! Query lexer and shift-reduce parser for lexico.
//!
//! The query language:
//!
//! - **Terms**: `heavy` - case-insensitive substring match
//! - **Quoted terms**: `"falcon heavy"` - verbatim, including spaces and operators
//! - **Implicit AND**: `falcon heavy` - adjacent expressions must all match
//! - **Connectives**: `falcon OR dragon`, `falcon AND heavy` (case-sensitive)
//! - **Negation**: `!heavy`, `!(falcon heavy)`
//! - **Scopes**: `mission_name:heavy`, `rocket.stage:(one OR two)`
//! - **Comparisons**: `year:>2010`, `<=5`
//!
//! Queries are tokenized lazily, parsed by an SLR(1) table generated from the grammar, and
//! malformed input is repaired by [`DefaultRecovery`] unless recovery is disabled.
//!
//! # Example
//!
//! ```
//! use lexico_query::{ParseOptions, compile};
//!
//! let tree = compile("mission_name:heavy !dragon", ParseOptions::default()).unwrap();
//! assert_eq!(tree.leaves().len(), 5);
//!
//! let strict = ParseOptions { recovery: false };
//! assert!(compile("mission_name:", strict).is_err());
//! ```

#![warn(missing_docs)]

mod error;
mod grammar;
mod lexer;
mod parser;
mod recovery;
mod table;
mod token;
mod tree;

pub use error::{GrammarError, ParseError, ParseErrorKind, QueryError};
pub use grammar::{NonTerminal, Production, QUERY_GRAMMAR, QUERY_START, Symbol};
pub use lexer::{Lexer, tokenize};
pub use parser::LrParser;
pub use recovery::{DefaultRecovery, ErrorRecovery, Recovery, Stalled};
pub use table::{Action, ParseTable};
pub use token::{Lookahead, Token, TokenKind, TokenValue, needs_quoting, quote_term};
pub use tree::ParseTree;
use tracing::debug;

/// Options controlling query compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Repair malformed input instead of failing.
    pub recovery: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { recovery: true }
    }
}

/// Compiles a query into a parse tree.
pub fn compile(query: &str, options: ParseOptions) -> Result<ParseTree, QueryError> {
    let parser = LrParser::new(ParseTable::query());
    let lexer = Lexer::new(query);
    let result = if options.recovery {
        let mut policy = DefaultRecovery::for_input(query);
        parser.parse(lexer, Some(&mut policy))
    } else {
        parser.parse(lexer, None)
    };

    match result {
        Ok(tree) => {
            debug!(query, "compiled query");
            Ok(tree)
        }
        Err(error) => Err(QueryError::new(error, query)),
    }
}

/// Compiles a query with error recovery enabled.
pub fn parse(query: &str) -> Result<ParseTree, QueryError> {
    compile(query, ParseOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict(query: &str) -> Result<ParseTree, QueryError> {
        compile(query, ParseOptions { recovery: false })
    }

    #[test]
    fn recovery_synthesizes_dangling_scope_term() {
        let tree = parse("field:").unwrap();
        let leaves = tree.leaves();
        assert_eq!(leaves.last().unwrap().kind, TokenKind::SearchTerm);
        assert_eq!(leaves.last().unwrap().lexeme(), "");
    }

    #[test]
    fn strict_mode_reports_acceptable_tokens() {
        let err = strict("field:").unwrap_err();
        assert!(err.acceptable().contains(&Lookahead::Token(TokenKind::SearchTerm)));
        assert!(err.to_string().contains("search term"));
    }

    #[test]
    fn recovery_closes_unbalanced_group() {
        let tree = parse("(falcon heavy").unwrap();
        assert!(tree.leaves().iter().any(|t| t.kind == TokenKind::RParen));
        assert!(strict("(falcon heavy").is_err());
    }

    #[test]
    fn recovery_discards_trailing_input() {
        let tree = parse("falcon ) dragon").unwrap();
        assert_eq!(tree.to_query_string(), "falcon");
    }

    #[test]
    fn recovery_turns_stray_operators_into_terms() {
        let tree = parse("AND falcon").unwrap();
        assert_eq!(tree.to_query_string(), "\"AND\" falcon");

        let tree = parse("a::b").unwrap();
        assert_eq!(tree.to_query_string(), "a : \":\" b");
    }

    #[test]
    fn dangling_connective_gets_empty_operand() {
        let tree = parse("falcon OR").unwrap();
        assert_eq!(tree.leaves().len(), 3);
    }

    #[test]
    fn dangling_comparison_gets_empty_operand() {
        assert!(parse(">").is_ok());
        assert!(parse("!").is_ok());
        assert!(strict("!").is_err());
    }

    #[test]
    fn query_string_round_trips() {
        for query in [
            "falcon heavy",
            "mission_name : heavy",
            "! ( a OR b ) c",
            "year : >= 2010",
            "\"falcon heavy\" AND ( a b )",
        ] {
            let tree = parse(query).unwrap();
            let reparsed = parse(&tree.to_query_string()).unwrap();
            assert_eq!(tree, reparsed, "{query}");
        }
    }
}
