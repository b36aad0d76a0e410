//! Query evaluation over JSON records.
//!
//! [`Engine`] compiles queries with `lexico-query` and evaluates the parse tree against a
//! dataset. Matching is delegated to a [`Comparator`]:
//!
//! - [`BinaryComparator`] keeps records containing every required term, in dataset order.
//! - [`FuzzyComparator`] keeps every record and ranks by edit-distance similarity, optionally
//!   backed by per-path [`SimilarityIndex`]es.
//!
//! Negation is pushed down with De Morgan's laws, so `!(a b)` is evaluated as `!a OR !b`.
//! Unscoped terms look at a record's immediate fields; `path:term` reaches any depth.

#![warn(missing_docs)]

mod builder;
mod comparator;
mod engine;
mod error;
mod eval;
mod flags;
mod index;
mod record;
mod similarity;
mod working;

pub use builder::{BuilderTerm, QueryBuilder, SearchOptions, TermOperator};
pub use comparator::{
    AND_MAX_WEIGHT, AND_MIN_WEIGHT, BinaryComparator, Comparator, FuzzyComparator, IndexBuilder,
    MISSING_PATH_SCORE, OR_MAX_WEIGHT, OR_MIN_WEIGHT,
};
pub use engine::{CompiledQuery, Engine, EngineBuilder, Hit, ScoreMode};
pub use error::EngineError;
pub use eval::Evaluator;
pub use flags::{ComparisonOp, Connective, EvalFlags};
pub use index::SimilarityIndex;
pub use lexico_query::{ParseTree, QueryError};
pub use record::{Record, atomic_text, fields, lookup};
pub use similarity::{DEFAULT_MAX_DISTANCE, MAX_DISTANCE_LIMIT, Similarity, TermMatcher};
pub use working::{RecordId, WorkingSet};
