//! Word-level fuzzy similarity built on Levenshtein automata.
//!
//! A value that contains the term outright scores 1. Otherwise each term word is matched
//! against its closest value word, `1 - distance / longer_length`, and the word scores are
//! averaged. Words further than the automaton's maximum distance contribute 0.

use levenshtein_automata::{DFA, Distance, LevenshteinAutomatonBuilder};

/// Default maximum edit distance per word.
pub const DEFAULT_MAX_DISTANCE: u8 = 2;

/// Largest supported edit distance; automaton construction grows quickly beyond it.
pub const MAX_DISTANCE_LIMIT: u8 = 3;

/// Builds per-term matchers sharing one automaton builder.
pub struct Similarity {
    /// Shared Levenshtein automaton builder.
    builder: LevenshteinAutomatonBuilder,
}

impl Similarity {
    /// Creates a similarity measure tolerating `max_distance` edits per word.
    ///
    /// Distances above [`MAX_DISTANCE_LIMIT`] are clamped.
    pub fn new(max_distance: u8, transpositions: bool) -> Self {
        let max_distance = max_distance.min(MAX_DISTANCE_LIMIT);
        Self {
            builder: LevenshteinAutomatonBuilder::new(max_distance, transpositions),
        }
    }

    /// Prepares `term` for scoring many values.
    pub fn matcher(&self, term: &str) -> TermMatcher {
        let term = term.trim().to_lowercase();
        let words = term
            .split_whitespace()
            .map(|word| (word.chars().count(), self.builder.build_dfa(word)))
            .collect();
        TermMatcher { term, words }
    }

    /// Scores a single value against a term.
    pub fn score(&self, value: &str, term: &str) -> f64 {
        self.matcher(term).score(value)
    }
}

impl Default for Similarity {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE, true)
    }
}

/// A term compiled into one automaton per word.
pub struct TermMatcher {
    /// Lowercased, trimmed term.
    term: String,
    /// Character length and automaton of each term word.
    words: Vec<(usize, DFA)>,
}

impl TermMatcher {
    /// Similarity of `value` to the term, in `[0, 1]`.
    pub fn score(&self, value: &str) -> f64 {
        if self.words.is_empty() {
            return 1.0;
        }
        let value = value.to_lowercase();
        if value.contains(&self.term) {
            return 1.0;
        }

        let total: f64 = self
            .words
            .iter()
            .map(|(len, dfa)| {
                value
                    .split_whitespace()
                    .map(|candidate| word_score(*len, dfa, candidate))
                    .fold(0.0, f64::max)
            })
            .sum();
        total / self.words.len() as f64
    }
}

/// Normalized similarity of one term word to one value word.
fn word_score(len: usize, dfa: &DFA, candidate: &str) -> f64 {
    match dfa.eval(candidate) {
        Distance::Exact(distance) => {
            let longest = len.max(candidate.chars().count()).max(1);
            (1.0 - f64::from(distance) / longest as f64).max(0.0)
        }
        Distance::AtLeast(_) => 0.0,
    }
}
