//! Similarity ranking: every record stays, scores decide the order.

use std::collections::BTreeMap;

use lexico_query::{ParseTree, Token};
use serde_json::Value;
use tracing::trace;

use super::{BinaryComparator, Comparator, IndexBuilder};
use crate::{
    eval::Evaluator,
    flags::EvalFlags,
    index::SimilarityIndex,
    record::{Record, atomic_text, fields, lookup},
    similarity::{Similarity, TermMatcher},
    working::{RecordId, WorkingSet},
};

/// Score added for a scoped search whose path is missing from a record.
pub const MISSING_PATH_SCORE: f64 = -9_007_199_254_740_991.0;

/// Weight of the weaker operand in a conjunction.
pub const AND_MIN_WEIGHT: f64 = 0.6;
/// Weight of the stronger operand in a conjunction.
pub const AND_MAX_WEIGHT: f64 = 0.4;
/// Weight of the stronger operand in a disjunction.
pub const OR_MAX_WEIGHT: f64 = 0.3;
/// Weight of the weaker operand in a disjunction.
pub const OR_MIN_WEIGHT: f64 = 0.7;

/// Scale from similarity to score.
const SCORE_SCALE: f64 = 100.0;

/// Ranks records by word-level edit distance.
///
/// Terms under a comparison operator are filtered exactly, as with [`BinaryComparator`].
/// Negated terms subtract their similarity instead of adding it.
#[derive(Default)]
pub struct FuzzyComparator {
    /// Similarity measure.
    similarity: Similarity,
    /// Indexes by dotted path.
    indexes: BTreeMap<String, SimilarityIndex>,
}

impl FuzzyComparator {
    /// Creates a comparator with a custom similarity measure.
    pub fn new(similarity: Similarity) -> Self {
        Self {
            similarity,
            indexes: BTreeMap::new(),
        }
    }

    /// The index for `path`, if one has been built.
    pub fn index(&self, path: &str) -> Option<&SimilarityIndex> {
        self.indexes.get(path)
    }

    /// Score contribution of one record, before negation.
    fn record_score(&self, matcher: &TermMatcher, record: &Record, scope: Option<&str>) -> f64 {
        match scope {
            Some(path) => match lookup(record, path) {
                Some(value) => value_score(matcher, value),
                None => MISSING_PATH_SCORE,
            },
            None => fields(record).map(|value| value_score(matcher, value)).sum(),
        }
    }

    /// Indexes usable for a search at `scope`.
    fn usable_indexes<'a>(&'a self, flags: &'a EvalFlags) -> Vec<&'a SimilarityIndex> {
        let candidates = &flags.candidate_index_fields;
        match &flags.scope {
            Some(path) if candidates.contains(path) => self.indexes.get(path).into_iter().collect(),
            Some(_) => Vec::new(),
            None => candidates
                .iter()
                .filter_map(|path| self.indexes.get(path))
                .collect(),
        }
    }

    /// Evaluates both operands from the same input and merges them.
    fn combine(
        eval: &Evaluator<'_>,
        (lhs, rhs): (&ParseTree, &ParseTree),
        mut data: WorkingSet,
        flags: &EvalFlags,
        keep: fn(bool, bool) -> bool,
        score: fn(f64, f64) -> f64,
    ) -> WorkingSet {
        let left = eval.eval(lhs, data.clone(), flags);
        let right = eval.eval(rhs, data.clone(), flags);
        let (left_members, right_members) = (left.membership(), right.membership());
        let member = |mask: &[bool], id: RecordId| mask.get(id.index()).copied().unwrap_or(false);

        data.retain(|&id| keep(member(&left_members, id), member(&right_members, id)));
        for &id in left.members().iter().chain(right.members()) {
            data.set_score(id, score(left.score(id), right.score(id)));
        }
        data
    }
}

/// Similarity of an atomic value, scaled to a score; other values score 0.
fn value_score(matcher: &TermMatcher, value: &Value) -> f64 {
    atomic_text(value).map_or(0.0, |text| SCORE_SCALE * matcher.score(&text))
}

impl Comparator for FuzzyComparator {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn and(
        &self,
        eval: &Evaluator<'_>,
        lhs: &ParseTree,
        rhs: &ParseTree,
        data: WorkingSet,
        flags: &EvalFlags,
    ) -> WorkingSet {
        Self::combine(
            eval,
            (lhs, rhs),
            data,
            flags,
            |l, r| l && r,
            |l, r| AND_MIN_WEIGHT * l.min(r) + AND_MAX_WEIGHT * l.max(r),
        )
    }

    fn or(
        &self,
        eval: &Evaluator<'_>,
        lhs: &ParseTree,
        rhs: &ParseTree,
        data: WorkingSet,
        flags: &EvalFlags,
    ) -> WorkingSet {
        Self::combine(
            eval,
            (lhs, rhs),
            data,
            flags,
            |l, r| l || r,
            |l, r| OR_MAX_WEIGHT * l.max(r) + OR_MIN_WEIGHT * l.min(r),
        )
    }

    fn search(
        &self,
        eval: &Evaluator<'_>,
        mut data: WorkingSet,
        term: &Token,
        flags: &EvalFlags,
    ) -> WorkingSet {
        if flags.operator.is_some() {
            return BinaryComparator.search(eval, data, term, flags);
        }

        let sign = if flags.exclude { -1.0 } else { 1.0 };
        let matcher = self.similarity.matcher(&term.lexeme());
        let indexes = self.usable_indexes(flags);

        if indexes.is_empty() {
            let records = eval.records();
            let scope = flags.scope.as_deref();
            let scored: Vec<(RecordId, f64)> = data
                .members()
                .iter()
                .filter_map(|&id| {
                    let record = records.get(id.index())?;
                    Some((id, self.record_score(&matcher, record, scope)))
                })
                .collect();
            for (id, score) in scored {
                data.add_score(id, sign * score);
            }
        } else {
            trace!(indexes = indexes.len(), "scoring from index");
            for index in indexes {
                for (id, similarity) in index.query(&matcher) {
                    data.add_score(id, sign * SCORE_SCALE * similarity);
                }
            }
        }
        data
    }

    fn indexing(&mut self) -> Option<&mut dyn IndexBuilder> {
        Some(self)
    }
}

impl IndexBuilder for FuzzyComparator {
    fn clear_index(&mut self) {
        self.indexes.clear();
    }

    fn add_to_index(&mut self, path: &str, key: &str, id: RecordId) {
        self.indexes
            .entry(path.to_string())
            .or_default()
            .insert(key, id);
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, sync::Arc};

    use lexico_query::parse;
    use serde_json::json;

    use super::*;

    fn dataset() -> Vec<Record> {
        vec![
            json!({"name": "Falcon Heavy", "year": 2018}),
            json!({"name": "Dragon", "year": 2012}),
            json!({"name": "Falcon 9", "year": 2010}),
        ]
    }

    fn scores(comparator: &FuzzyComparator, query: &str, flags: &EvalFlags) -> WorkingSet {
        let records = dataset();
        let tree = parse(query).unwrap();
        Evaluator::new(comparator, &records).eval(&tree, WorkingSet::full(records.len()), flags)
    }

    fn id(index: usize) -> RecordId {
        RecordId::new(index)
    }

    #[test]
    fn keeps_every_record() {
        let result = scores(&FuzzyComparator::default(), "starship", &EvalFlags::default());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn closer_records_score_higher() {
        let result = scores(&FuzzyComparator::default(), "name:heavey", &EvalFlags::default());
        assert!(result.score(id(0)) > result.score(id(2)));
        assert!(result.score(id(0)) > result.score(id(1)));
    }

    #[test]
    fn negation_subtracts() {
        let result = scores(&FuzzyComparator::default(), "name:!dragon", &EvalFlags::default());
        assert!(result.score(id(1)) < 0.0);
        assert!(result.score(id(1)) < result.score(id(0)));
    }

    #[test]
    fn missing_path_is_heavily_penalized() {
        let result = scores(&FuzzyComparator::default(), "missing:x", &EvalFlags::default());
        assert_eq!(result.score(id(0)), MISSING_PATH_SCORE);
    }

    #[test]
    fn conjunction_weights() {
        let comparator = FuzzyComparator::default();
        let flags = EvalFlags::default();
        let lhs = scores(&comparator, "name:falcon", &flags);
        let rhs = scores(&comparator, "name:heavy", &flags);
        let both = scores(&comparator, "name:falcon name:heavy", &flags);

        for index in 0..3 {
            let (l, r) = (lhs.score(id(index)), rhs.score(id(index)));
            let expected = AND_MIN_WEIGHT * l.min(r) + AND_MAX_WEIGHT * l.max(r);
            assert!((both.score(id(index)) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn disjunction_weights() {
        let comparator = FuzzyComparator::default();
        let flags = EvalFlags::default();
        let lhs = scores(&comparator, "name:falcon", &flags);
        let rhs = scores(&comparator, "name:dragon", &flags);
        let either = scores(&comparator, "name:falcon OR name:dragon", &flags);

        for index in 0..3 {
            let (l, r) = (lhs.score(id(index)), rhs.score(id(index)));
            let expected = OR_MAX_WEIGHT * l.max(r) + OR_MIN_WEIGHT * l.min(r);
            assert!((either.score(id(index)) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn comparisons_filter_exactly() {
        let result = scores(&FuzzyComparator::default(), "year:>2011", &EvalFlags::default());
        assert_eq!(result.members(), &[id(0), id(1)]);
    }

    #[test]
    fn indexed_search_matches_scan() {
        let records = dataset();
        let mut indexed = FuzzyComparator::default();
        for (index, record) in records.iter().enumerate() {
            if let Some(name) = record["name"].as_str() {
                indexed.add_to_index("name", name, id(index));
            }
        }
        let fields = Arc::new(BTreeSet::from(["name".to_string()]));
        let flags = EvalFlags::with_index_fields(fields);

        let scanned = scores(&FuzzyComparator::default(), "name:falcn", &EvalFlags::default());
        let from_index = scores(&indexed, "name:falcn", &flags);
        for index in 0..3 {
            assert!((scanned.score(id(index)) - from_index.score(id(index))).abs() < 1e-9);
        }
        assert_eq!(indexed.index("name").map(SimilarityIndex::len), Some(3));
    }
}
