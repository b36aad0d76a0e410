//! The search facade: compile queries, run them, rank the results.

use std::{collections::BTreeSet, fmt, sync::Arc};

use lexico_query::{ParseOptions, ParseTree};
use serde::Serialize;
use tracing::debug;

use crate::{
    comparator::{BinaryComparator, Comparator, IndexBuilder},
    error::EngineError,
    eval::Evaluator,
    flags::EvalFlags,
    record::{Record, atomic_text, lookup},
    working::{RecordId, WorkingSet},
};

/// What happens to scores between runs over the engine's own dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoreMode {
    /// Every run starts from zero.
    #[default]
    Reset,
    /// Scores carry over from previous runs.
    Accumulate,
}

/// A parsed query, reusable across runs and datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Parse tree, shared between clones.
    tree: Arc<ParseTree>,
    /// Query text as given.
    source: String,
}

impl CompiledQuery {
    /// The parse tree.
    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    /// The query text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A ranked result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    /// Position of the record in the searched dataset.
    pub position: usize,
    /// Accumulated score; always 0 for exact comparators.
    pub score: f64,
    /// The record itself.
    pub record: Record,
}

/// Records owned by the engine.
#[derive(Debug, Default)]
struct Dataset {
    /// Records in insertion order.
    records: Vec<Record>,
    /// Working set reused across runs.
    working: WorkingSet,
    /// Whether the comparator's index reflects these records.
    indexed: bool,
}

impl Dataset {
    /// Wraps a batch of records.
    fn new(records: Vec<Record>) -> Self {
        Self {
            working: WorkingSet::full(records.len()),
            records,
            indexed: false,
        }
    }
}

/// Configures an [`Engine`].
pub struct EngineBuilder {
    /// Matching strategy.
    comparator: Box<dyn Comparator>,
    /// Records the engine owns from the start.
    records: Option<Vec<Record>>,
    /// Dotted paths to index.
    index_fields: BTreeSet<String>,
    /// Whether malformed queries are repaired.
    recovery: bool,
    /// Score handling between runs.
    score_mode: ScoreMode,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            comparator: Box::new(BinaryComparator),
            records: None,
            index_fields: BTreeSet::new(),
            recovery: true,
            score_mode: ScoreMode::default(),
        }
    }
}

impl EngineBuilder {
    /// Uses `comparator` instead of [`BinaryComparator`].
    pub fn comparator(self, comparator: impl Comparator + 'static) -> Self {
        self.boxed_comparator(Box::new(comparator))
    }

    /// Uses an already boxed comparator.
    pub fn boxed_comparator(mut self, comparator: Box<dyn Comparator>) -> Self {
        self.comparator = comparator;
        self
    }

    /// Gives the engine its own dataset.
    pub fn records(mut self, records: Vec<Record>) -> Self {
        self.records = Some(records);
        self
    }

    /// Indexes `path` before searching. Requires an indexing comparator.
    pub fn index_field(mut self, path: impl Into<String>) -> Self {
        self.index_fields.insert(path.into());
        self
    }

    /// Indexes every path in `paths`.
    pub fn index_fields<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_fields.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Enables or disables error recovery; enabled by default.
    pub fn recovery(mut self, enabled: bool) -> Self {
        self.recovery = enabled;
        self
    }

    /// Sets the score handling between runs.
    pub fn score_mode(mut self, mode: ScoreMode) -> Self {
        self.score_mode = mode;
        self
    }

    /// Builds the engine.
    ///
    /// Indexes are built lazily on the first run, so an indexing misconfiguration surfaces there.
    pub fn build(self) -> Engine {
        Engine {
            comparator: self.comparator,
            index_fields: Arc::new(self.index_fields),
            recovery: self.recovery,
            score_mode: self.score_mode,
            dataset: self.records.map(Dataset::new),
        }
    }
}

/// Compiles and runs queries against records.
///
/// ```
/// use lexico_engine::Engine;
/// use serde_json::json;
///
/// let records = vec![json!({"name": "Falcon Heavy"}), json!({"name": "Dragon"})];
/// let mut engine = Engine::builder().records(records).build();
/// let hits = engine.search("name:heavy", None).unwrap();
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].position, 0);
/// ```
pub struct Engine {
    /// Matching strategy.
    comparator: Box<dyn Comparator>,
    /// Indexed paths, shared with every evaluation.
    index_fields: Arc<BTreeSet<String>>,
    /// Whether malformed queries are repaired.
    recovery: bool,
    /// Score handling between runs.
    score_mode: ScoreMode,
    /// Records owned by the engine, if any.
    dataset: Option<Dataset>,
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::default().build()
    }
}

impl Engine {
    /// Starts configuring an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Name of the configured comparator.
    pub fn comparator_name(&self) -> &'static str {
        self.comparator.name()
    }

    /// Number of records the engine owns.
    pub fn len(&self) -> usize {
        self.dataset.as_ref().map_or(0, |d| d.records.len())
    }

    /// Returns true when the engine owns no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses a query.
    pub fn compile(&self, query: &str) -> Result<CompiledQuery, EngineError> {
        let options = ParseOptions {
            recovery: self.recovery,
        };
        let tree = lexico_query::compile(query, options)?;
        Ok(CompiledQuery {
            tree: Arc::new(tree),
            source: query.to_string(),
        })
    }

    /// Runs a compiled query.
    ///
    /// With `records`, a fresh working set is built over them and any index is rebuilt. Without,
    /// the engine's own dataset is searched and its working set reused.
    pub fn run(
        &mut self,
        query: &CompiledQuery,
        records: Option<&[Record]>,
    ) -> Result<Vec<Hit>, EngineError> {
        let flags = EvalFlags::with_index_fields(Arc::clone(&self.index_fields));

        let hits = match records {
            Some(records) => {
                if !self.index_fields.is_empty() {
                    let builder = indexer(self.comparator.as_mut())?;
                    builder.clear_index();
                    index_records(builder, &self.index_fields, records, 0..records.len());
                    if let Some(dataset) = &mut self.dataset {
                        dataset.indexed = false;
                    }
                }
                let working = WorkingSet::full(records.len());
                let result = Evaluator::new(self.comparator.as_ref(), records).eval(
                    query.tree(),
                    working,
                    &flags,
                );
                rank(records, &result)
            }
            None => {
                let dataset = self.dataset.as_mut().ok_or(EngineError::NoDataset)?;
                if !dataset.indexed && !self.index_fields.is_empty() {
                    let builder = indexer(self.comparator.as_mut())?;
                    builder.clear_index();
                    let count = dataset.records.len();
                    index_records(builder, &self.index_fields, &dataset.records, 0..count);
                    dataset.indexed = true;
                }
                if self.score_mode == ScoreMode::Reset {
                    dataset.working.reset_scores();
                }
                let result = Evaluator::new(self.comparator.as_ref(), &dataset.records).eval(
                    query.tree(),
                    dataset.working.clone(),
                    &flags,
                );
                dataset.working.absorb_scores(&result);
                rank(&dataset.records, &result)
            }
        };

        debug!(
            query = query.source(),
            comparator = self.comparator.name(),
            hits = hits.len(),
            "query evaluated"
        );
        Ok(hits)
    }

    /// Compiles and runs a query.
    pub fn search(
        &mut self,
        query: &str,
        records: Option<&[Record]>,
    ) -> Result<Vec<Hit>, EngineError> {
        let compiled = self.compile(query)?;
        self.run(&compiled, records)
    }

    /// Appends a record to the engine's dataset, indexing it if paths are configured.
    pub fn add_record(&mut self, record: Record) -> Result<RecordId, EngineError> {
        let builder = if self.index_fields.is_empty() {
            None
        } else {
            Some(indexer(self.comparator.as_mut())?)
        };

        let dataset = self.dataset.get_or_insert_with(Dataset::default);
        dataset.records.push(record);
        let id = dataset.working.push();

        if let Some(builder) = builder {
            if dataset.indexed {
                index_records(builder, &self.index_fields, &dataset.records, [id.index()]);
            } else {
                builder.clear_index();
                let count = dataset.records.len();
                index_records(builder, &self.index_fields, &dataset.records, 0..count);
                dataset.indexed = true;
            }
        }
        Ok(id)
    }
}

/// The comparator's index builder, or a configuration error.
fn indexer(comparator: &mut dyn Comparator) -> Result<&mut dyn IndexBuilder, EngineError> {
    let name = comparator.name();
    comparator
        .indexing()
        .ok_or(EngineError::IndexingUnsupported { comparator: name })
}

/// Adds the atomic values at each indexed path of the given records.
fn index_records(
    builder: &mut dyn IndexBuilder,
    fields: &BTreeSet<String>,
    records: &[Record],
    positions: impl IntoIterator<Item = usize>,
) {
    let mut entries = 0usize;
    for position in positions {
        let Some(record) = records.get(position) else {
            continue;
        };
        for path in fields {
            if let Some(key) = lookup(record, path).and_then(atomic_text) {
                builder.add_to_index(path, &key, RecordId::new(position));
                entries += 1;
            }
        }
    }
    debug!(fields = fields.len(), entries, "indexed records");
}

/// Orders the members of `result` by descending score; ties keep working-set order.
fn rank(records: &[Record], result: &WorkingSet) -> Vec<Hit> {
    let mut hits: Vec<Hit> = result
        .members()
        .iter()
        .filter_map(|&id| {
            let record = records.get(id.index())?;
            Some(Hit {
                position: id.index(),
                score: result.score(id),
                record: record.clone(),
            })
        })
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits
}
