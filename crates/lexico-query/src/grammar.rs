//! The query grammar.
//!
//! ```text
//! S          → Search S | ε
//! Search     → And | Or | SearchType
//! And        → SearchType AND Search
//! Or         → SearchType OR Search
//! SearchType → Group | Term
//! Group      → TERM : Term
//! Term       → SearchTerm | ! SearchTerm | CmpOp NUMBER | CmpOp TERM
//! SearchTerm → TERM | ( S )
//! CmpOp      → > | < | >= | <=
//! ```

use std::fmt;

use Symbol::{NonTerminal as N, Terminal as T};

use crate::token::{TokenKind, TokenKind as Tk};

use NonTerminal as Nt;

/// Labels of internal parse tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonTerminal {
    /// Implicitly AND-ed list of searches.
    S,
    /// One search expression.
    Search,
    /// Explicit `AND`.
    And,
    /// Explicit `OR`.
    Or,
    /// A scoped group or a plain term.
    SearchType,
    /// `field : Term`.
    Group,
    /// A term with optional negation or comparison.
    Term,
    /// A bare term or a parenthesized list.
    SearchTerm,
    /// A comparison operator.
    CmpOp,
}

impl NonTerminal {
    /// Every nonterminal, in goto table column order.
    pub const ALL: [Self; 9] = [
        Self::S,
        Self::Search,
        Self::And,
        Self::Or,
        Self::SearchType,
        Self::Group,
        Self::Term,
        Self::SearchTerm,
        Self::CmpOp,
    ];

    /// Returns the goto table column of this nonterminal.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A token kind.
    Terminal(TokenKind),
    /// A nonterminal.
    NonTerminal(NonTerminal),
}

/// A production `lhs → rhs`. An empty `rhs` is an ε-production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Production {
    /// Left-hand side.
    pub lhs: NonTerminal,
    /// Right-hand side symbols.
    pub rhs: &'static [Symbol],
}

impl Production {
    /// Returns true for an ε-production.
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.lhs)?;
        if self.rhs.is_empty() {
            return write!(f, " ε");
        }
        for symbol in self.rhs {
            match symbol {
                Symbol::Terminal(kind) => write!(f, " {kind}")?,
                Symbol::NonTerminal(nt) => write!(f, " {nt}")?,
            }
        }
        Ok(())
    }
}

/// Start symbol of the query grammar.
pub const QUERY_START: NonTerminal = NonTerminal::S;

/// Productions of the query grammar.
#[rustfmt::skip]
pub const QUERY_GRAMMAR: &[Production] = &[
    Production { lhs: Nt::S, rhs: &[N(Nt::Search), N(Nt::S)] },
    Production { lhs: Nt::S, rhs: &[] },
    Production { lhs: Nt::Search, rhs: &[N(Nt::And)] },
    Production { lhs: Nt::Search, rhs: &[N(Nt::Or)] },
    Production { lhs: Nt::Search, rhs: &[N(Nt::SearchType)] },
    Production { lhs: Nt::And, rhs: &[N(Nt::SearchType), T(Tk::And), N(Nt::Search)] },
    Production { lhs: Nt::Or, rhs: &[N(Nt::SearchType), T(Tk::Or), N(Nt::Search)] },
    Production { lhs: Nt::SearchType, rhs: &[N(Nt::Group)] },
    Production { lhs: Nt::SearchType, rhs: &[N(Nt::Term)] },
    Production { lhs: Nt::Group, rhs: &[T(Tk::SearchTerm), T(Tk::GroupTerminator), N(Nt::Term)] },
    Production { lhs: Nt::Term, rhs: &[N(Nt::SearchTerm)] },
    Production { lhs: Nt::Term, rhs: &[T(Tk::Exclude), N(Nt::SearchTerm)] },
    Production { lhs: Nt::Term, rhs: &[N(Nt::CmpOp), T(Tk::Number)] },
    Production { lhs: Nt::Term, rhs: &[N(Nt::CmpOp), T(Tk::SearchTerm)] },
    Production { lhs: Nt::SearchTerm, rhs: &[T(Tk::SearchTerm)] },
    Production { lhs: Nt::SearchTerm, rhs: &[T(Tk::LParen), N(Nt::S), T(Tk::RParen)] },
    Production { lhs: Nt::CmpOp, rhs: &[T(Tk::Gt)] },
    Production { lhs: Nt::CmpOp, rhs: &[T(Tk::Lt)] },
    Production { lhs: Nt::CmpOp, rhs: &[T(Tk::Gte)] },
    Production { lhs: Nt::CmpOp, rhs: &[T(Tk::Lte)] },
];
