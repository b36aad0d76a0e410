//! Error types for lexico-engine.

use lexico_query::QueryError;
use thiserror::Error;

/// Errors raised while compiling or running queries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The query could not be compiled.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Index fields were configured for a comparator that cannot index.
    #[error("the {comparator} comparator does not support indexing")]
    IndexingUnsupported {
        /// Name of the configured comparator.
        comparator: &'static str,
    },

    /// A built query holds a term that query syntax cannot express.
    #[error("cannot express {term:?} in a query: {reason}")]
    UnrepresentableTerm {
        /// The offending term or scope, as given to the builder.
        term: String,
        /// What makes it inexpressible.
        reason: &'static str,
    },

    /// A run was requested without records and none were supplied at construction.
    #[error("no dataset to search; supply records to the engine or to the run")]
    NoDataset,
}
