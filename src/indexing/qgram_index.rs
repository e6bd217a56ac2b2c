//! Q-gram index for fuzzy prefix search over entities
//!
//! Built once from a full record collection, immutable afterwards. A query
//! runs through:
//!
//! ```text
//! normalize → q-grams → posting lists → merge → overlap filter → PED → rank
//! ```
//!
//! Only the posting lookup touches shared state, and only for reading, so any
//! number of queries can run concurrently on one index. Everything a query
//! computes, its statistics included, is returned to the caller.

use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use super::entity::{BuildError, Entity, EntityStore, Record};
use super::filter::{filter_candidates, threshold};
use super::loader;
use super::postings::{PostingsIndex, PARALLEL_THRESHOLD};
use super::rank::{rank, Match};
use crate::algorithms::{
    normalize, normalize_chars, Backend, EntityId, Posting, QGramExtractor, MAX_QGRAM_SIZE,
};

/// Candidate count above which PED verification runs on the thread pool.
const PARALLEL_VERIFY_THRESHOLD: usize = 1_000;

/// Errors a query is rejected with. The index is never modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Query is empty after normalization
    #[error("query prefix must not be empty")]
    EmptyQuery,

    /// `prefix_len - q * delta` is not positive
    #[error("threshold {prefix_len} - {q} * {delta} is not positive, lower delta")]
    NonPositiveThreshold {
        prefix_len: usize,
        q: usize,
        delta: usize,
    },

    /// The index has not finished building
    #[error("index is not ready")]
    NotReady,
}

/// Index configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Gram width (1-32)
    pub q: usize,
    /// Also index synonyms under their entity's id
    pub use_synonyms: bool,
    /// Merge and distance implementations
    pub backend: Backend,
    /// Shard the build across threads for large inputs
    pub parallel_build: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            q: 3,
            use_synonyms: false,
            backend: Backend::default(),
            parallel_build: false,
        }
    }
}

impl IndexConfig {
    pub fn new(q: usize) -> Self {
        Self {
            q,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_synonyms(mut self, use_synonyms: bool) -> Self {
        self.use_synonyms = use_synonyms;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_parallel_build(mut self, parallel_build: bool) -> Self {
        self.parallel_build = parallel_build;
        self
    }

    /// Check the configuration before building.
    pub fn validate(&self) -> Result<(), BuildError> {
        if !(1..=MAX_QGRAM_SIZE).contains(&self.q) {
            return Err(BuildError::InvalidConfig(format!(
                "q must be in 1..={}, got {}",
                MAX_QGRAM_SIZE, self.q
            )));
        }
        Ok(())
    }
}

/// Per-query statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Posting lists fed into the merge (one per matching query gram
    /// occurrence)
    pub lists_merged: usize,
    /// Length of the merged list, i.e. potential PED computations
    pub candidates: usize,
    /// Candidates that passed the overlap filter, i.e. actual PED
    /// computations
    pub ped_computations: usize,
}

/// Result of one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Matches within the tolerance, ranked
    pub matches: Vec<Match>,
    pub stats: QueryStats,
}

impl QueryOutcome {
    /// `(id, distance)` pairs in rank order
    pub fn pairs(&self) -> Vec<(EntityId, usize)> {
        self.matches.iter().map(|m| (m.id, m.distance)).collect()
    }
}

/// A built, queryable q-gram index
#[derive(Debug, Clone)]
pub struct QGramIndex {
    config: IndexConfig,
    extractor: QGramExtractor,
    postings: PostingsIndex,
    store: EntityStore,
    /// Normalized indexed names per entity, position = id - 1
    names: Vec<Vec<String>>,
}

impl QGramIndex {
    /// Build the index from records in id order (the first record gets id 1).
    ///
    /// All-or-nothing: the first malformed record aborts the build.
    pub fn build<I>(config: IndexConfig, records: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Record>,
    {
        config.validate()?;
        let start = Instant::now();

        let entities = records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| Entity::from_record(idx + 1, record))
            .collect::<Result<Vec<_>, _>>()?;

        let extractor = QGramExtractor::new(config.q);
        let sharded = config.parallel_build && entities.len() >= PARALLEL_THRESHOLD;

        let store = EntityStore::from_entities(entities);
        let normalize_entity =
            |e: &Entity| -> Vec<String> { e.indexed_names(config.use_synonyms).map(normalize).collect() };
        let names: Vec<Vec<String>> = if sharded {
            store.par_iter().map(normalize_entity).collect()
        } else {
            store.iter().map(normalize_entity).collect()
        };

        let postings = if sharded {
            let num_shards = std::thread::available_parallelism()
                .map(|p| p.get().min(16))
                .unwrap_or(8);
            PostingsIndex::build_sharded(&names, extractor, num_shards)
        } else {
            PostingsIndex::build(&names, extractor)
        };

        info!(
            "built q-gram index: {} entities, {} grams, {} postings (q={}, synonyms={}, sharded={}) in {:?}",
            store.len(),
            postings.num_grams(),
            postings.num_postings(),
            config.q,
            config.use_synonyms,
            sharded,
            start.elapsed()
        );

        Ok(Self {
            config,
            extractor,
            postings,
            store,
            names,
        })
    }

    /// Build from tab-separated input with a header line.
    pub fn build_from_reader<R: BufRead>(config: IndexConfig, reader: R) -> Result<Self, BuildError> {
        config.validate()?;
        let records = loader::read_records(reader)?;
        Self::build(config, records)
    }

    /// Build from a tab-separated file with a header line.
    pub fn build_from_file(config: IndexConfig, path: impl AsRef<Path>) -> Result<Self, BuildError> {
        config.validate()?;
        let path = path.as_ref();
        debug!("reading records from {}", path.display());
        let records = loader::read_records_from_file(path)?;
        Self::build(config, records)
    }

    /// Find all entities with `PED(prefix, name) <= delta`, ranked by
    /// distance and then popularity.
    ///
    /// The prefix is normalized first; it must not be empty afterwards and
    /// `len - q * delta` must be positive.
    pub fn find_matches(&self, prefix: &str, delta: usize) -> Result<QueryOutcome, QueryError> {
        let query_chars = normalize_chars(prefix);
        if query_chars.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        let q = self.config.q;
        let min_overlap =
            threshold(query_chars.len(), q, delta).ok_or(QueryError::NonPositiveThreshold {
                prefix_len: query_chars.len(),
                q,
                delta,
            })?;

        let query: String = query_chars.iter().collect();
        let grams = self.extractor.extract(&query);
        let lists: Vec<&[Posting]> = grams.iter().filter_map(|g| self.postings.get(g)).collect();
        let merged = self.config.backend.merger().merge(&lists);
        let survivors = filter_candidates(&merged, min_overlap);

        let stats = QueryStats {
            lists_merged: lists.len(),
            candidates: merged.len(),
            ped_computations: survivors.len(),
        };

        let verify = |candidate: &Posting| self.verify(&query_chars, candidate.id, delta);
        let matches: Vec<Match> = if survivors.len() >= PARALLEL_VERIFY_THRESHOLD {
            survivors.par_iter().filter_map(verify).collect()
        } else {
            survivors.iter().filter_map(verify).collect()
        };
        let matches = rank(matches, &self.store, None);

        debug!(
            "query '{}' (delta={}): {} lists merged, {} candidates, {} PED computations, {} matches",
            query,
            delta,
            stats.lists_merged,
            stats.candidates,
            stats.ped_computations,
            matches.len()
        );

        Ok(QueryOutcome { matches, stats })
    }

    /// [`find_matches`](Self::find_matches) truncated to the best `k`.
    pub fn find_top_matches(
        &self,
        prefix: &str,
        delta: usize,
        k: usize,
    ) -> Result<QueryOutcome, QueryError> {
        let mut outcome = self.find_matches(prefix, delta)?;
        outcome.matches.truncate(k);
        Ok(outcome)
    }

    /// Run several queries in parallel with the same tolerance.
    pub fn batch_find_matches(
        &self,
        prefixes: &[String],
        delta: usize,
    ) -> Vec<Result<QueryOutcome, QueryError>> {
        prefixes
            .par_iter()
            .map(|prefix| self.find_matches(prefix, delta))
            .collect()
    }

    /// Smallest PED over the entity's indexed names, if within `delta`.
    fn verify(&self, query: &[char], id: EntityId, delta: usize) -> Option<Match> {
        let evaluator = self.config.backend.prefix_distance();
        let names = self.names.get(id.checked_sub(1)?)?;

        let (name_index, distance) = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let name_chars: SmallVec<[char; 64]> = name.chars().collect();
                (i, evaluator.distance(query, &name_chars, delta))
            })
            .min_by_key(|&(_, d)| d)?;

        (distance <= delta).then_some(Match {
            id,
            distance,
            name_index,
        })
    }

    /// Entity by id, `None` for unknown ids
    pub fn get_info(&self, id: EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    /// The original (unnormalized) name a match was found through.
    pub fn matched_name(&self, m: &Match) -> Option<&str> {
        self.store
            .get(m.id)?
            .indexed_names(self.config.use_synonyms)
            .nth(m.name_index)
    }

    /// Posting list of a gram
    pub fn postings(&self, gram: &str) -> Option<&[Posting]> {
        self.postings.get(gram)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn entities(&self) -> &EntityStore {
        &self.store
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of distinct grams
    pub fn num_grams(&self) -> usize {
        self.postings.num_grams()
    }
}
