//! Parse tree evaluation.
//!
//! The evaluator owns the structural rules: scopes, negation parity, comparison binding and
//! the De Morgan swap. Everything that decides whether a record matches is delegated to the
//! [`Comparator`].

use lexico_query::{NonTerminal, ParseTree, TokenKind};
use tracing::trace;

use crate::{
    comparator::Comparator,
    flags::{ComparisonOp, Connective, EvalFlags},
    record::Record,
    working::WorkingSet,
};

/// Evaluates parse trees against a dataset.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    /// Strategy for matching and scoring.
    comparator: &'a dyn Comparator,
    /// The dataset every [`crate::RecordId`] refers to.
    records: &'a [Record],
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator.
    pub fn new(comparator: &'a dyn Comparator, records: &'a [Record]) -> Self {
        Self {
            comparator,
            records,
        }
    }

    /// The dataset under evaluation.
    pub fn records(&self) -> &'a [Record] {
        self.records
    }

    /// Evaluates `tree` against `data`.
    pub fn eval(&self, tree: &ParseTree, data: WorkingSet, flags: &EvalFlags) -> WorkingSet {
        match tree {
            ParseTree::Leaf(token) => match token.kind {
                TokenKind::SearchTerm | TokenKind::Number => {
                    trace!(
                        term = %token.lexeme(),
                        scope = ?flags.scope,
                        exclude = flags.exclude,
                        "search"
                    );
                    self.comparator.search(self, data, token, flags)
                }
                _ => data.cleared(),
            },
            ParseTree::Node { label, children } => match label {
                NonTerminal::S => self.eval_list(children, data, flags),
                NonTerminal::And => self.eval_connective(Connective::And, children, data, flags),
                NonTerminal::Or => self.eval_connective(Connective::Or, children, data, flags),
                NonTerminal::Group => self.eval_group(children, data, flags),
                NonTerminal::Term => self.eval_term(children, data, flags),
                NonTerminal::Search
                | NonTerminal::SearchType
                | NonTerminal::SearchTerm
                | NonTerminal::CmpOp => self.eval_wrapper(children, data, flags),
            },
        }
    }

    /// Implicit conjunction of a list. Empty lists leave the set untouched.
    fn eval_list(&self, children: &[ParseTree], data: WorkingSet, flags: &EvalFlags) -> WorkingSet {
        let items: Vec<&ParseTree> = children.iter().filter(|c| !c.is_empty()).collect();
        match items.as_slice() {
            [] => data,
            [only] => self.eval(only, data, flags),
            [lhs, rhs] => self.connect(Connective::And, lhs, rhs, data, flags),
            [first, rest @ ..] => {
                let tail = ParseTree::node(
                    NonTerminal::S,
                    rest.iter().map(|&tree| tree.clone()).collect(),
                );
                self.connect(Connective::And, first, &tail, data, flags)
            }
        }
    }

    /// `lhs AND rhs` or `lhs OR rhs`.
    fn eval_connective(
        &self,
        connective: Connective,
        children: &[ParseTree],
        data: WorkingSet,
        flags: &EvalFlags,
    ) -> WorkingSet {
        match children {
            [lhs, _, rhs] => self.connect(connective, lhs, rhs, data, flags),
            _ => data,
        }
    }

    /// Dispatches a connective to the comparator, swapped under negation.
    fn connect(
        &self,
        connective: Connective,
        lhs: &ParseTree,
        rhs: &ParseTree,
        data: WorkingSet,
        flags: &EvalFlags,
    ) -> WorkingSet {
        match connective.under(flags.exclude) {
            Connective::And => self.comparator.and(self, lhs, rhs, data, flags),
            Connective::Or => self.comparator.or(self, lhs, rhs, data, flags),
        }
    }

    /// `segment : Term` narrows the scope for everything below.
    fn eval_group(&self, children: &[ParseTree], data: WorkingSet, flags: &EvalFlags) -> WorkingSet {
        let [segment, _, term] = children else {
            return data;
        };
        let Some(segment) = segment.token() else {
            return data;
        };
        self.eval(term, data, &flags.scoped(&segment.lexeme()))
    }

    /// Handles the `!` and comparison prefixes of a term.
    fn eval_term(&self, children: &[ParseTree], data: WorkingSet, flags: &EvalFlags) -> WorkingSet {
        match children {
            [first, rest @ ..] if first.is_token(TokenKind::Exclude) => {
                self.eval_wrapper(rest, data, &flags.negated())
            }
            [first, operand, ..] if first.label() == Some(NonTerminal::CmpOp) => {
                let operator = first
                    .children()
                    .first()
                    .and_then(ParseTree::token)
                    .and_then(|token| ComparisonOp::from_kind(token.kind));
                match operator {
                    Some(op) if operand.is_token(TokenKind::Number) => {
                        self.eval(operand, data, &flags.comparing(op))
                    }
                    _ => self.eval(operand, data, flags),
                }
            }
            _ => self.eval_wrapper(children, data, flags),
        }
    }

    /// Single-child wrappers, including `( S )` with the parentheses stripped.
    fn eval_wrapper(
        &self,
        children: &[ParseTree],
        data: WorkingSet,
        flags: &EvalFlags,
    ) -> WorkingSet {
        let inner = match children {
            [first, rest @ ..] if first.is_token(TokenKind::LParen) => rest,
            _ => children,
        };
        match inner.first() {
            Some(child) => self.eval(child, data, flags),
            None => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use lexico_query::parse;
    use serde_json::json;

    use super::*;
    use crate::comparator::BinaryComparator;

    fn dataset() -> Vec<Record> {
        vec![
            json!({"name": "Falcon Heavy", "year": 2018, "rocket": {"stage": "two"}}),
            json!({"name": "Dragon", "year": 2012, "rocket": {"stage": "one"}}),
            json!({"name": "Falcon 9", "year": 2010, "rocket": {"stage": "two"}}),
        ]
    }

    fn matches(query: &str) -> Vec<usize> {
        let records = dataset();
        let tree = parse(query).unwrap();
        let eval = Evaluator::new(&BinaryComparator, &records);
        eval.eval(&tree, WorkingSet::full(records.len()), &EvalFlags::default())
            .members()
            .iter()
            .map(|id| id.index())
            .collect()
    }

    #[test]
    fn empty_query_keeps_everything() {
        assert_eq!(matches(""), vec![0, 1, 2]);
        assert_eq!(matches("()"), vec![0, 1, 2]);
    }

    #[test]
    fn implicit_and() {
        assert_eq!(matches("falcon heavy"), vec![0]);
    }

    #[test]
    fn or_keeps_dataset_order() {
        assert_eq!(matches("dragon OR heavy"), vec![0, 1]);
    }

    #[test]
    fn negation_applies_de_morgan() {
        assert_eq!(matches("!(falcon heavy)"), vec![1, 2]);
        assert_eq!(matches("!(dragon OR heavy)"), vec![2]);
        assert_eq!(matches("!dragon"), vec![0, 2]);
    }

    #[test]
    fn nested_scopes() {
        assert_eq!(matches("rocket:(stage:two)"), vec![0, 2]);
        assert_eq!(matches("rocket.stage:one"), vec![1]);
    }

    #[test]
    fn comparison_binds_only_numbers() {
        assert_eq!(matches("year:>2011"), vec![0, 1]);
        assert_eq!(matches("year:<=2012"), vec![1, 2]);
        // A text operand drops the operator and matches as a substring.
        assert_eq!(matches("name:>dragon"), vec![1]);
        assert_eq!(matches("name:>dragon"), matches("name:dragon"));
    }
}
