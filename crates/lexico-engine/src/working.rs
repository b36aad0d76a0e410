//! Working sets: the records still in play during evaluation, with their scores.

/// Stable identifier of a record in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(usize);

impl RecordId {
    /// Creates an identifier from a dataset position.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the record in its dataset.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An ordered subset of a dataset plus a score per record.
///
/// Scores are dense over the whole dataset, so a record filtered out of one branch still
/// carries the score it had when the branch started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSet {
    /// Members, in dataset order unless a combinator reorders them.
    members: Vec<RecordId>,
    /// Score for every record in the dataset, indexed by [`RecordId`].
    scores: Vec<f64>,
}

impl WorkingSet {
    /// Creates a set holding every record of a dataset of `len` records, all scored zero.
    pub fn full(len: usize) -> Self {
        Self {
            members: (0..len).map(RecordId).collect(),
            scores: vec![0.0; len],
        }
    }

    /// Members in order.
    pub fn members(&self) -> &[RecordId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true when no record is left.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Size of the underlying dataset.
    pub fn capacity(&self) -> usize {
        self.scores.len()
    }

    /// Score of a record. Unknown identifiers score zero.
    pub fn score(&self, id: RecordId) -> f64 {
        self.scores.get(id.0).copied().unwrap_or_default()
    }

    /// Replaces the score of a record.
    pub fn set_score(&mut self, id: RecordId, score: f64) {
        if let Some(slot) = self.scores.get_mut(id.0) {
            *slot = score;
        }
    }

    /// Adds `delta` to the score of a record.
    pub fn add_score(&mut self, id: RecordId, delta: f64) {
        if let Some(slot) = self.scores.get_mut(id.0) {
            *slot += delta;
        }
    }

    /// Zeroes every score.
    pub fn reset_scores(&mut self) {
        self.scores.fill(0.0);
    }

    /// Keeps the members for which `keep` returns true, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&RecordId) -> bool) {
        self.members.retain(keep);
    }

    /// Drops every member; scores are kept.
    pub fn cleared(mut self) -> Self {
        self.members.clear();
        self
    }

    /// Appends a new record to the dataset and the member list.
    pub fn push(&mut self) -> RecordId {
        let id = RecordId(self.scores.len());
        self.scores.push(0.0);
        self.members.push(id);
        id
    }

    /// A lookup table answering "is this record a member".
    pub fn membership(&self) -> Vec<bool> {
        let mut mask = vec![false; self.scores.len()];
        for id in &self.members {
            if let Some(slot) = mask.get_mut(id.0) {
                *slot = true;
            }
        }
        mask
    }

    /// Copies the scores of `other` into this set, leaving membership untouched.
    pub fn absorb_scores(&mut self, other: &Self) {
        self.scores.clone_from(&other.scores);
    }
}
