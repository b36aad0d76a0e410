//! Exact filtering: a record either matches or is dropped.

use lexico_query::{ParseTree, Token};
use serde_json::Value;

use super::Comparator;
use crate::{
    eval::Evaluator,
    flags::{ComparisonOp, EvalFlags},
    record::{Record, atomic_text, fields, lookup},
    working::WorkingSet,
};

/// Case-insensitive substring matching with numeric comparisons.
///
/// Scores are never touched, so results keep dataset order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryComparator;

impl BinaryComparator {
    /// Returns true if `record` satisfies `term` under `flags`, ignoring negation.
    pub fn matches(&self, record: &Record, term: &Token, flags: &EvalFlags) -> bool {
        Matcher::new(term, flags).record(record, flags.scope.as_deref())
    }
}

impl Comparator for BinaryComparator {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn and(
        &self,
        eval: &Evaluator<'_>,
        lhs: &ParseTree,
        rhs: &ParseTree,
        data: WorkingSet,
        flags: &EvalFlags,
    ) -> WorkingSet {
        let narrowed = eval.eval(lhs, data, flags);
        eval.eval(rhs, narrowed, flags)
    }

    fn or(
        &self,
        eval: &Evaluator<'_>,
        lhs: &ParseTree,
        rhs: &ParseTree,
        mut data: WorkingSet,
        flags: &EvalFlags,
    ) -> WorkingSet {
        let left = eval.eval(lhs, data.clone(), flags).membership();
        let right = eval.eval(rhs, data.clone(), flags).membership();
        let member = |mask: &[bool], index: usize| mask.get(index).copied().unwrap_or(false);
        data.retain(|id| member(&left, id.index()) || member(&right, id.index()));
        data
    }

    fn search(
        &self,
        eval: &Evaluator<'_>,
        mut data: WorkingSet,
        term: &Token,
        flags: &EvalFlags,
    ) -> WorkingSet {
        let matcher = Matcher::new(term, flags);
        let scope = flags.scope.as_deref();
        let records = eval.records();
        data.retain(|id| {
            records
                .get(id.index())
                .is_some_and(|record| matcher.record(record, scope))
                != flags.exclude
        });
        data
    }
}

/// A term prepared for repeated matching.
struct Matcher {
    /// Lowercased term text.
    needle: String,
    /// Comparison to apply, when the term is numeric and an operator is pending.
    comparison: Option<(ComparisonOp, f64)>,
}

impl Matcher {
    /// Prepares `term` under `flags`.
    fn new(term: &Token, flags: &EvalFlags) -> Self {
        let comparison = flags.operator.zip(term.number());
        Self {
            needle: term.lexeme().to_lowercase(),
            comparison,
        }
    }

    /// Matches a record, either at `scope` or across its immediate fields.
    fn record(&self, record: &Record, scope: Option<&str>) -> bool {
        match scope {
            Some(path) => lookup(record, path).is_some_and(|value| self.value(value)),
            None => fields(record).any(|value| self.value(value)),
        }
    }

    /// Matches a single value.
    fn value(&self, value: &Value) -> bool {
        if let Some((op, operand)) = self.comparison {
            match value {
                Value::Number(n) => return n.as_f64().is_some_and(|n| op.compare(n, operand)),
                Value::String(s) => {
                    return s
                        .trim()
                        .parse::<f64>()
                        .is_ok_and(|n| n.is_finite() && op.compare(n, operand));
                }
                _ => {}
            }
        }
        atomic_text(value).is_some_and(|text| text.to_lowercase().contains(&self.needle))
    }
}
