//! Comparison strategies.
//!
//! The evaluator walks the parse tree and hands connectives and leaves to a [`Comparator`].
//! A comparator decides what matching means: [`BinaryComparator`] filters records,
//! [`FuzzyComparator`] keeps every record and ranks them by similarity.

mod binary;
mod fuzzy;

pub use binary::BinaryComparator;
pub use fuzzy::{
    AND_MAX_WEIGHT, AND_MIN_WEIGHT, FuzzyComparator, MISSING_PATH_SCORE, OR_MAX_WEIGHT,
    OR_MIN_WEIGHT,
};
use lexico_query::{ParseTree, Token};

use crate::{
    eval::Evaluator,
    flags::EvalFlags,
    working::{RecordId, WorkingSet},
};

/// A matching and scoring strategy.
pub trait Comparator {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Combines two subtrees conjunctively.
    ///
    /// Called with the connective already adjusted for negation parity.
    fn and(
        &self,
        eval: &Evaluator<'_>,
        lhs: &ParseTree,
        rhs: &ParseTree,
        data: WorkingSet,
        flags: &EvalFlags,
    ) -> WorkingSet;

    /// Combines two subtrees disjunctively.
    fn or(
        &self,
        eval: &Evaluator<'_>,
        lhs: &ParseTree,
        rhs: &ParseTree,
        data: WorkingSet,
        flags: &EvalFlags,
    ) -> WorkingSet;

    /// Applies a single term to the working set.
    fn search(
        &self,
        eval: &Evaluator<'_>,
        data: WorkingSet,
        term: &Token,
        flags: &EvalFlags,
    ) -> WorkingSet;

    /// Index maintenance, for comparators that support it.
    fn indexing(&mut self) -> Option<&mut dyn IndexBuilder> {
        None
    }
}

/// Maintains per-path indexes inside a comparator.
pub trait IndexBuilder {
    /// Drops every indexed entry.
    fn clear_index(&mut self);

    /// Records that `id` has the atomic value `key` at `path`.
    fn add_to_index(&mut self, path: &str, key: &str, id: RecordId);
}
