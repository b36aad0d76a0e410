//! Evaluation context threaded down the parse tree.

use std::{collections::BTreeSet, fmt, sync::Arc};

use lexico_query::TokenKind;

/// An ordering comparison bound to a numeric operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl ComparisonOp {
    /// Maps a comparison token to its operator.
    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Gt => Some(Self::Gt),
            TokenKind::Gte => Some(Self::Gte),
            TokenKind::Lt => Some(Self::Lt),
            TokenKind::Lte => Some(Self::Lte),
            _ => None,
        }
    }

    /// Applies the comparison as `candidate <op> operand`.
    pub fn compare(self, candidate: f64, operand: f64) -> bool {
        match self {
            Self::Gt => candidate > operand,
            Self::Gte => candidate >= operand,
            Self::Lt => candidate < operand,
            Self::Lte => candidate <= operand,
        }
    }

    /// Query syntax for the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// How two operands are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// Both operands must match.
    And,
    /// Either operand may match.
    Or,
}

impl Connective {
    /// The connective actually applied under the given negation parity.
    ///
    /// `!(a AND b)` is `!a OR !b` and `!(a OR b)` is `!a AND !b`.
    pub fn under(self, exclude: bool) -> Self {
        match (self, exclude) {
            (Self::And, true) => Self::Or,
            (Self::Or, true) => Self::And,
            (connective, false) => connective,
        }
    }

    /// Query keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Flags inherited by every node below the point where they are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalFlags {
    /// Dotted path searches are restricted to.
    pub scope: Option<String>,
    /// Negation parity; true under an odd number of `!`.
    pub exclude: bool,
    /// Pending comparison for the next numeric operand.
    pub operator: Option<ComparisonOp>,
    /// Paths with a prebuilt similarity index.
    pub candidate_index_fields: Arc<BTreeSet<String>>,
}

impl EvalFlags {
    /// Root flags for an evaluation over indexed `fields`.
    pub fn with_index_fields(fields: Arc<BTreeSet<String>>) -> Self {
        Self {
            candidate_index_fields: fields,
            ..Self::default()
        }
    }

    /// Flags with `segment` appended to the scope.
    pub fn scoped(&self, segment: &str) -> Self {
        let scope = match &self.scope {
            Some(parent) => format!("{parent}.{segment}"),
            None => segment.to_string(),
        };
        Self {
            scope: Some(scope),
            ..self.clone()
        }
    }

    /// Flags with the negation parity flipped.
    pub fn negated(&self) -> Self {
        Self {
            exclude: !self.exclude,
            ..self.clone()
        }
    }

    /// Flags carrying a comparison operator.
    pub fn comparing(&self, operator: ComparisonOp) -> Self {
        Self {
            operator: Some(operator),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_nest_with_dots() {
        let flags = EvalFlags::default().scoped("rocket").scoped("stage");
        assert_eq!(flags.scope.as_deref(), Some("rocket.stage"));
    }

    #[test]
    fn negation_toggles() {
        let flags = EvalFlags::default().negated();
        assert!(flags.exclude);
        assert!(!flags.negated().exclude);
    }

    #[test]
    fn de_morgan_swap() {
        assert_eq!(Connective::And.under(true), Connective::Or);
        assert_eq!(Connective::Or.under(true), Connective::And);
        assert_eq!(Connective::And.under(false), Connective::And);
    }

    #[test]
    fn comparisons() {
        assert!(ComparisonOp::Gt.compare(3.0, 2.0));
        assert!(!ComparisonOp::Gt.compare(2.0, 2.0));
        assert!(ComparisonOp::Gte.compare(2.0, 2.0));
        assert!(ComparisonOp::Lt.compare(1.0, 2.0));
        assert!(ComparisonOp::Lte.compare(2.0, 2.0));
        assert_eq!(ComparisonOp::from_kind(TokenKind::Lte), Some(ComparisonOp::Lte));
        assert_eq!(ComparisonOp::from_kind(TokenKind::And), None);
    }
}
