//! Per-path similarity indexes.

use std::collections::BTreeMap;

use crate::{similarity::TermMatcher, working::RecordId};

/// Maps the distinct atomic values of one path to the records holding them.
///
/// Keys are lowercased so each distinct value is scored once per query, however many records
/// share it.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    /// Lowercased value to records, in insertion order.
    entries: BTreeMap<String, Vec<RecordId>>,
}

impl SimilarityIndex {
    /// Adds a record under `key`.
    pub fn insert(&mut self, key: &str, id: RecordId) {
        self.entries.entry(key.to_lowercase()).or_default().push(id);
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records with a non-zero similarity to the matcher's term, with that similarity.
    pub fn query<'a>(
        &'a self,
        matcher: &'a TermMatcher,
    ) -> impl Iterator<Item = (RecordId, f64)> + 'a {
        self.entries.iter().flat_map(move |(key, ids)| {
            let score = matcher.score(key);
            let hits = if score > 0.0 { ids.as_slice() } else { &[] };
            hits.iter().map(move |&id| (id, score))
        })
    }
}
