//! Programmatic query construction.
//!
//! [`QueryBuilder`] assembles query text from fluent calls. Consecutive searches are joined
//! with `AND` unless `.or()` is called between them, and connectives fold left to right:
//!
//! ```
//! use lexico_engine::{QueryBuilder, SearchOptions};
//!
//! let query = QueryBuilder::new()
//!     .search("falcon", SearchOptions::default())
//!     .or()
//!     .search("dragon", SearchOptions::scope("name"))
//!     .search(2010, SearchOptions::scope("year").gt());
//! assert_eq!(query.to_string(), "(falcon OR name:dragon) AND year:>2010");
//! ```

use std::fmt;

use lexico_query::quote_term;

use crate::{
    engine::{CompiledQuery, Engine},
    error::EngineError,
    flags::{ComparisonOp, Connective},
};

/// The operand of a search call.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderTerm {
    /// Literal text, quoted when it contains query syntax.
    Text(String),
    /// A number, rendered bare so it can bind to a comparison.
    Number(f64),
    /// A nested query, rendered in parentheses.
    Group(QueryBuilder),
}

impl From<&str> for BuilderTerm {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for BuilderTerm {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for BuilderTerm {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for BuilderTerm {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<QueryBuilder> for BuilderTerm {
    fn from(query: QueryBuilder) -> Self {
        Self::Group(query)
    }
}

/// A prefix applied to a search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOperator {
    /// `!`
    Exclude,
    /// An ordering comparison.
    Compare(ComparisonOp),
}

impl TermOperator {
    /// Query syntax for the prefix.
    fn prefix(self) -> &'static str {
        match self {
            Self::Exclude => "!",
            Self::Compare(op) => op.symbol(),
        }
    }
}

/// Scope and prefix of a search call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// Dotted path the term is restricted to.
    pub scope: Option<String>,
    /// Prefix operator.
    pub operator: Option<TermOperator>,
}

impl SearchOptions {
    /// Options restricted to `path`.
    pub fn scope(path: impl Into<String>) -> Self {
        Self {
            scope: Some(path.into()),
            operator: None,
        }
    }

    /// Negates the term.
    pub fn exclude(self) -> Self {
        self.with(TermOperator::Exclude)
    }

    /// Requires values greater than the term.
    pub fn gt(self) -> Self {
        self.with(TermOperator::Compare(ComparisonOp::Gt))
    }

    /// Requires values greater than or equal to the term.
    pub fn gte(self) -> Self {
        self.with(TermOperator::Compare(ComparisonOp::Gte))
    }

    /// Requires values less than the term.
    pub fn lt(self) -> Self {
        self.with(TermOperator::Compare(ComparisonOp::Lt))
    }

    /// Requires values less than or equal to the term.
    pub fn lte(self) -> Self {
        self.with(TermOperator::Compare(ComparisonOp::Lte))
    }

    /// Sets the operator.
    fn with(mut self, operator: TermOperator) -> Self {
        self.operator = Some(operator);
        self
    }
}

/// A subexpression being assembled.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    /// A single search call.
    Search {
        /// Operand.
        term: BuilderTerm,
        /// Scope and prefix.
        options: SearchOptions,
    },
    /// Two expressions joined by a connective.
    Binary {
        /// Left operand.
        lhs: Box<Self>,
        /// Connective.
        connective: Connective,
        /// Right operand.
        rhs: Box<Self>,
    },
}

/// An item on the builder stack.
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    /// A finished subexpression.
    Expr(Expr),
    /// A connective waiting for its right operand.
    Connective(Connective),
}

/// Builds query text without string concatenation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    /// Operands and pending connectives; never deeper than two after a fold.
    stack: Vec<Entry>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a search, joined to what came before by `AND` unless a connective is pending.
    pub fn search(mut self, term: impl Into<BuilderTerm>, options: SearchOptions) -> Self {
        if matches!(self.stack.last(), Some(Entry::Expr(_))) {
            self.stack.push(Entry::Connective(Connective::And));
        }
        self.stack.push(Entry::Expr(Expr::Search {
            term: term.into(),
            options,
        }));
        self.fold();
        self
    }

    /// Joins the next search with `AND`.
    pub fn and(self) -> Self {
        self.connect(Connective::And)
    }

    /// Joins the next search with `OR`.
    pub fn or(self) -> Self {
        self.connect(Connective::Or)
    }

    /// Returns true if nothing has been searched yet.
    pub fn is_empty(&self) -> bool {
        !self.stack.iter().any(|entry| matches!(entry, Entry::Expr(_)))
    }

    /// Compiles the built query with `engine`.
    ///
    /// Fails with [`EngineError::UnrepresentableTerm`] rather than compiling a query whose text
    /// would parse differently from what was built.
    pub fn compile(&self, engine: &Engine) -> Result<CompiledQuery, EngineError> {
        self.check()?;
        engine.compile(&self.to_string())
    }

    /// Verifies that every term renders to text that lexes back to the same structure.
    pub fn check(&self) -> Result<(), EngineError> {
        self.stack.iter().try_for_each(|entry| match entry {
            Entry::Expr(expr) => expr.check(),
            Entry::Connective(_) => Ok(()),
        })
    }

    /// Records a connective; a second connective in a row replaces the first.
    fn connect(mut self, connective: Connective) -> Self {
        match self.stack.last_mut() {
            Some(Entry::Connective(pending)) => *pending = connective,
            Some(Entry::Expr(_)) => self.stack.push(Entry::Connective(connective)),
            None => {}
        }
        self
    }

    /// Collapses `lhs connective rhs` on top of the stack into one expression.
    fn fold(&mut self) {
        while self.stack.len() >= 3 {
            let at = self.stack.len() - 3;
            let mut top = self.stack.split_off(at).into_iter();
            match (top.next(), top.next(), top.next()) {
                (
                    Some(Entry::Expr(lhs)),
                    Some(Entry::Connective(connective)),
                    Some(Entry::Expr(rhs)),
                ) => {
                    self.stack.push(Entry::Expr(Expr::Binary {
                        lhs: Box::new(lhs),
                        connective,
                        rhs: Box::new(rhs),
                    }));
                }
                (a, b, c) => {
                    self.stack.extend([a, b, c].into_iter().flatten());
                    break;
                }
            }
        }
    }
}

impl Expr {
    /// Checks the scope, operator and operand of every search in this expression.
    fn check(&self) -> Result<(), EngineError> {
        match self {
            Self::Search { term, options } => {
                if let Some(scope) = &options.scope {
                    check_text(scope)?;
                }
                match term {
                    BuilderTerm::Text(text) => check_text(text),
                    BuilderTerm::Number(n) if !n.is_finite() => Err(unrepresentable(
                        n.to_string(),
                        "only finite numbers are written as numbers",
                    )),
                    BuilderTerm::Number(_) => Ok(()),
                    BuilderTerm::Group(query) => match options.operator {
                        Some(TermOperator::Compare(op)) => Err(unrepresentable(
                            format!("{}({query})", op.symbol()),
                            "comparisons apply to single terms, not groups",
                        )),
                        _ => query.check(),
                    },
                }
            }
            Self::Binary { lhs, rhs, .. } => {
                lhs.check()?;
                rhs.check()
            }
        }
    }
}

/// Rejects text that no quoting can carry through the lexer intact.
fn check_text(text: &str) -> Result<(), EngineError> {
    if text.contains('"') {
        return Err(unrepresentable(text, "double quotes cannot be escaped"));
    }
    if text.trim().is_empty() {
        return Err(unrepresentable(text, "blank terms are dropped by the lexer"));
    }
    Ok(())
}

/// Builds an [`EngineError::UnrepresentableTerm`].
fn unrepresentable(term: impl Into<String>, reason: &'static str) -> EngineError {
    EngineError::UnrepresentableTerm {
        term: term.into(),
        reason,
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.stack {
            if let Entry::Expr(expr) = entry {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{expr}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search { term, options } => {
                if let Some(scope) = &options.scope {
                    write!(f, "{}:", quote_term(scope))?;
                }
                if let Some(operator) = options.operator {
                    f.write_str(operator.prefix())?;
                }
                match term {
                    BuilderTerm::Text(text) => write!(f, "{}", quote_term(text)),
                    BuilderTerm::Number(n) => write!(f, "{n}"),
                    BuilderTerm::Group(query) => write!(f, "({query})"),
                }
            }
            Self::Binary {
                lhs,
                connective,
                rhs,
            } => {
                match lhs.as_ref() {
                    Self::Binary { .. } => write!(f, "({lhs})")?,
                    Self::Search { .. } => write!(f, "{lhs}")?,
                }
                write!(f, " {} {rhs}", connective.keyword())
            }
        }
    }
}
