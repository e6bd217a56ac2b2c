//! Shared handle over an index that may still be building.
//!
//! A [`SharedIndex`] starts in the *building* state, where every query is
//! rejected with [`QueryError::NotReady`]. Publishing a successfully built
//! [`QGramIndex`] moves it to *ready*; the transition is one-way and a failed
//! build leaves the handle in *building*.
//!
//! # Usage
//!
//! ```ignore
//! use qgram_index::indexing::{IndexConfig, SharedIndex};
//!
//! let shared = SharedIndex::new();
//! let handle = shared.clone();
//! std::thread::spawn(move || {
//!     handle.build_from_file(IndexConfig::default(), "entities.tsv").unwrap();
//! });
//! // Rejected until the build thread has published the index
//! let result = shared.find_matches("frei", 1);
//! ```
//!
//! # Performance Notes
//!
//! - The lock guards only the `Option<Arc<_>>` slot; it is held for the
//!   pointer copy, never during a query
//! - Queries run on an `Arc` snapshot, so any number proceed concurrently
//! - The build itself runs outside the lock

use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

use super::entity::{BuildError, Entity, Record};
use super::qgram_index::{IndexConfig, QGramIndex, QueryError, QueryOutcome};
use crate::algorithms::EntityId;

/// Thread-safe, clonable handle to an index in the building or ready state.
#[derive(Clone, Default)]
pub struct SharedIndex {
    inner: Arc<RwLock<Option<Arc<QGramIndex>>>>,
}

impl SharedIndex {
    /// Create a handle in the building state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle that is ready from the start.
    pub fn from_index(index: QGramIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(Arc::new(index)))),
        }
    }

    /// Publish a built index.
    ///
    /// Returns the index back if the handle is already ready.
    pub fn publish(&self, index: QGramIndex) -> Result<(), QGramIndex> {
        let mut slot = self.inner.write();
        if slot.is_some() {
            warn!("ignoring second publish on a ready index");
            return Err(index);
        }
        *slot = Some(Arc::new(index));
        info!("index is ready");
        Ok(())
    }

    fn publish_built(&self, index: QGramIndex) -> Result<(), BuildError> {
        self.publish(index).map_err(|_| BuildError::AlreadyBuilt)
    }

    /// Build from records and publish on success.
    ///
    /// On failure nothing is published and the handle keeps rejecting
    /// queries. Fails with [`BuildError::AlreadyBuilt`] once an index has
    /// been published, including by a concurrent build that finished first.
    pub fn build<I>(&self, config: IndexConfig, records: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = Record>,
    {
        if self.is_ready() {
            return Err(BuildError::AlreadyBuilt);
        }
        self.publish_built(QGramIndex::build(config, records)?)
    }

    /// Build from a tab-separated file and publish on success.
    pub fn build_from_file(
        &self,
        config: IndexConfig,
        path: impl AsRef<Path>,
    ) -> Result<(), BuildError> {
        if self.is_ready() {
            return Err(BuildError::AlreadyBuilt);
        }
        self.publish_built(QGramIndex::build_from_file(config, path)?)
    }

    /// Snapshot of the ready index, `None` while building.
    pub fn snapshot(&self) -> Option<Arc<QGramIndex>> {
        self.inner.read().clone()
    }

    fn ready(&self) -> Result<Arc<QGramIndex>, QueryError> {
        self.snapshot().ok_or(QueryError::NotReady)
    }

    /// Whether the index has been published.
    pub fn is_ready(&self) -> bool {
        self.inner.read().is_some()
    }

    /// See [`QGramIndex::find_matches`].
    pub fn find_matches(&self, prefix: &str, delta: usize) -> Result<QueryOutcome, QueryError> {
        self.ready()?.find_matches(prefix, delta)
    }

    /// See [`QGramIndex::find_top_matches`].
    pub fn find_top_matches(
        &self,
        prefix: &str,
        delta: usize,
        k: usize,
    ) -> Result<QueryOutcome, QueryError> {
        self.ready()?.find_top_matches(prefix, delta, k)
    }

    /// Entity by id. `Ok(None)` for unknown ids.
    pub fn get_info(&self, id: EntityId) -> Result<Option<Entity>, QueryError> {
        Ok(self.ready()?.get_info(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexing::loader::parse_line;
    use std::thread;

    fn records() -> Vec<Record> {
        vec![parse_line(2, "frei\t3\t\tfirst"), parse_line(3, "brei\t2\t\tsecond")]
    }

    #[test]
    fn test_rejects_queries_while_building() {
        let shared = SharedIndex::new();
        assert!(!shared.is_ready());
        assert_eq!(shared.find_matches("frei", 0), Err(QueryError::NotReady));
        assert_eq!(shared.get_info(1), Err(QueryError::NotReady));
    }

    #[test]
    fn test_ready_after_build() {
        let shared = SharedIndex::new();
        shared.build(IndexConfig::default(), records()).unwrap();
        assert!(shared.is_ready());
        assert_eq!(
            shared.find_matches("frei", 1).unwrap().pairs(),
            vec![(1, 0), (2, 1)]
        );
        assert_eq!(shared.find_top_matches("frei", 1, 1).unwrap().pairs(), vec![(1, 0)]);
        assert_eq!(shared.get_info(2).unwrap().map(|e| e.name), Some("brei".to_string()));
        assert_eq!(shared.get_info(9), Ok(None));
    }

    #[test]
    fn test_failed_build_stays_building() {
        let shared = SharedIndex::new();
        let bad = vec![parse_line(2, "frei\t3"), parse_line(3, "brei\tx")];
        assert!(shared.build(IndexConfig::default(), bad).is_err());
        assert!(!shared.is_ready());
        assert_eq!(shared.find_matches("frei", 0), Err(QueryError::NotReady));
    }

    #[test]
    fn test_publish_is_one_way() {
        let first = QGramIndex::build(IndexConfig::default(), records()).unwrap();
        let second = QGramIndex::build(IndexConfig::new(2), records()).unwrap();
        let shared = SharedIndex::from_index(first);
        assert!(shared.publish(second).is_err());
        assert_eq!(shared.snapshot().unwrap().config().q, 3);
    }

    #[test]
    fn test_second_build_is_rejected() {
        let shared = SharedIndex::new();
        shared.build(IndexConfig::default(), records()).unwrap();

        let other = vec![parse_line(2, "brei\t9")];
        let err = shared.build(IndexConfig::default(), other).unwrap_err();
        assert!(matches!(err, BuildError::AlreadyBuilt));
        assert_eq!(shared.get_info(1).unwrap().map(|e| e.name), Some("frei".to_string()));
    }

    #[test]
    fn test_second_build_from_file_is_rejected() {
        let shared = SharedIndex::from_index(
            QGramIndex::build(IndexConfig::default(), records()).unwrap(),
        );
        let err = shared
            .build_from_file(IndexConfig::default(), "does-not-matter.tsv")
            .unwrap_err();
        assert!(matches!(err, BuildError::AlreadyBuilt));
    }

    #[test]
    fn test_concurrent_builds_publish_once() {
        let shared = SharedIndex::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || shared.build(IndexConfig::default(), records()).is_ok())
            })
            .collect();
        let published = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(published, 1);
        assert!(shared.is_ready());
    }

    #[test]
    fn test_concurrent_queries() {
        let shared = SharedIndex::new();
        shared.build(IndexConfig::default(), records()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let delta = i % 2;
                    shared.find_matches("frei", delta).unwrap().pairs()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let pairs = handle.join().unwrap();
            if i % 2 == 0 {
                assert_eq!(pairs, vec![(1, 0)]);
            } else {
                assert_eq!(pairs, vec![(1, 0), (2, 1)]);
            }
        }
    }
}
