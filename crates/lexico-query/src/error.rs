//! Error types for parse table construction, parsing and query compilation.

use std::{error, fmt};

use thiserror::Error;

use crate::{
    table::Action,
    token::{Lookahead, TokenKind},
};

/// The grammar is not SLR(1).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Two actions compete for the same table cell.
    #[error("conflict in state {state} on {lookahead}: {existing:?} vs {incoming:?}")]
    Conflict {
        /// State with the conflicting cell.
        state: usize,
        /// Column of the conflicting cell.
        lookahead: Lookahead,
        /// Action already in the cell.
        existing: Action,
        /// Action that could not be placed.
        incoming: Action,
    },
}

/// Why the parser stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No action exists and recovery is disabled.
    Unexpected,
    /// The recovery policy had no applicable rule.
    RecoveryFailed,
    /// The recovery policy kept intervening without the parser making progress.
    RecoveryStalled,
    /// The parse table references a missing production or goto entry.
    InvalidTable,
}

/// Parse error with the set of tokens the grammar would have accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Byte position of the offending token, or None at end of input.
    pub position: Option<usize>,
    /// Kind of the offending token, or None at end of input.
    pub found: Option<TokenKind>,
    /// Lookaheads with an action in the failing state.
    pub acceptable: Vec<Lookahead>,
}

impl ParseError {
    /// Creates a parse error.
    pub fn new(
        kind: ParseErrorKind,
        position: Option<usize>,
        found: Option<TokenKind>,
        acceptable: Vec<Lookahead>,
    ) -> Self {
        Self {
            kind,
            position,
            found,
            acceptable,
        }
    }

    /// Returns true if `kind` was acceptable at the failure point.
    pub fn accepts(&self, kind: TokenKind) -> bool {
        self.acceptable.contains(&Lookahead::Token(kind))
    }

}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = self.found.map_or(Lookahead::End, Lookahead::Token);
        let expected = format_expected(&self.acceptable);
        match self.kind {
            ParseErrorKind::Unexpected => write!(f, "unexpected {found}, expected {expected}"),
            ParseErrorKind::RecoveryFailed => {
                write!(f, "cannot recover from {found}, expected {expected}")
            }
            ParseErrorKind::RecoveryStalled => {
                write!(f, "error recovery made no progress at {found}")
            }
            ParseErrorKind::InvalidTable => write!(f, "parse table is inconsistent"),
        }
    }
}

impl error::Error for ParseError {}

/// Formats an acceptable set as "a, b or c".
fn format_expected(acceptable: &[Lookahead]) -> String {
    let names: Vec<String> = acceptable.iter().map(ToString::to_string).collect();
    match names.as_slice() {
        [] => "nothing".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("one of {} or {last}", init.join(", ")),
    }
}

/// A query compilation error with the query text for context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The underlying parse error.
    pub error: ParseError,
    /// The original query string.
    pub query: String,
}

impl QueryError {
    /// Creates a query error.
    pub fn new(error: ParseError, query: impl Into<String>) -> Self {
        Self {
            error,
            query: query.into(),
        }
    }

    /// Lookaheads the grammar would have accepted.
    pub fn acceptable(&self) -> &[Lookahead] {
        &self.error.acceptable
    }

    /// Byte position of the error; end of input maps to the query length.
    pub fn position(&self) -> usize {
        self.error.position.unwrap_or(self.query.len())
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        let error = &self.error;
        match error.found {
            _ if error.acceptable == [Lookahead::Token(TokenKind::RParen)] => {
                Some("Add a closing parenthesis ) to match the opening one")
            }
            Some(TokenKind::GroupTerminator) => {
                Some("Quote terms containing ':' to search for them literally")
            }
            Some(TokenKind::And | TokenKind::Or) => {
                Some("AND and OR need a term on both sides, e.g. 'falcon OR dragon'")
            }
            None if error.accepts(TokenKind::SearchTerm) => {
                Some("The query ends early; add a term after the last operator")
            }
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "query syntax error: {}", self.error)?;
        writeln!(f, "  {}", self.query)?;
        let column = self.query[..self.position().min(self.query.len())]
            .chars()
            .count();
        write!(f, "  {}^", " ".repeat(column))?;
        if let Some(hint) = self.suggestion() {
            write!(f, "\n  hint: {hint}")?;
        }
        Ok(())
    }
}

impl error::Error for QueryError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.error)
    }
}
