//! Python bindings
//!
//! Exposes the index with the interface of the classic Python q-gram index
//! (`QGramIndex(q, use_syns)`, `build_from_file`, `find_matches`,
//! `get_infos`, ...) plus the standalone `ped` and `merge_lists` helpers, so
//! it can be dropped in as the accelerated implementation.

use pyo3::create_exception;
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::algorithms::{self, Backend, EntityId, Posting};
use crate::indexing::{BuildError, Entity, IndexConfig, QueryError, SharedIndex};

/// `(synonym, name, score, infos)` as returned by `get_infos`. Ids are per
/// entity, so the synonym slot repeats the name.
type InfoTuple = (String, String, i64, Vec<String>);

// ============================================================================
// Custom Python Exceptions
// ============================================================================
//
// QGramIndexError (base)
//   ├── IndexBuildError - malformed input records or configuration
//   └── QueryValidationError - empty query, non-positive threshold, not built

create_exception!(qgram_index, QGramIndexError, pyo3::exceptions::PyException);
create_exception!(qgram_index, IndexBuildError, QGramIndexError);
create_exception!(qgram_index, QueryValidationError, QGramIndexError);

fn build_err(err: BuildError) -> PyErr {
    match err {
        BuildError::Io(e) => PyIOError::new_err(e.to_string()),
        other => IndexBuildError::new_err(other.to_string()),
    }
}

fn query_err(err: QueryError) -> PyErr {
    QueryValidationError::new_err(err.to_string())
}

fn info_tuple(entity: Entity) -> InfoTuple {
    (entity.name.clone(), entity.name, entity.score, entity.infos)
}

/// Python wrapper for the q-gram index.
///
/// Queries before `build_from_file` has succeeded raise
/// `QueryValidationError`. The index can be built only once.
#[pyclass(name = "QGramIndex")]
struct PyQGramIndex {
    config: IndexConfig,
    shared: SharedIndex,
}

#[pymethods]
impl PyQGramIndex {
    #[new]
    #[pyo3(signature = (q, use_syns=false, backend="accelerated"))]
    fn new(q: usize, use_syns: bool, backend: &str) -> PyResult<Self> {
        let backend: Backend = backend.parse().map_err(PyValueError::new_err)?;
        let config = IndexConfig::new(q)
            .with_synonyms(use_syns)
            .with_backend(backend);
        config.validate().map_err(build_err)?;
        Ok(Self {
            config,
            shared: SharedIndex::new(),
        })
    }

    /// Build the index from a tab-separated entity file.
    ///
    /// Raises `IndexBuildError` if the index has already been built.
    fn build_from_file(&self, py: Python<'_>, file_name: &str) -> PyResult<()> {
        let config = self.config;
        let shared = self.shared.clone();
        py.allow_threads(|| shared.build_from_file(config, file_name))
            .map_err(build_err)
    }

    /// Find `(id, ped)` pairs ordered by PED and then entity score.
    fn find_matches(
        &self,
        py: Python<'_>,
        prefix: &str,
        delta: usize,
    ) -> PyResult<Vec<(EntityId, usize)>> {
        let outcome = py
            .allow_threads(|| self.shared.find_matches(prefix, delta))
            .map_err(query_err)?;
        Ok(outcome.pairs())
    }

    /// Like `find_matches`, also returning
    /// `(ped_computations, potential_ped_computations)`.
    fn find_matches_with_stats(
        &self,
        py: Python<'_>,
        prefix: &str,
        delta: usize,
    ) -> PyResult<(Vec<(EntityId, usize)>, (usize, usize))> {
        let outcome = py
            .allow_threads(|| self.shared.find_matches(prefix, delta))
            .map_err(query_err)?;
        let stats = (outcome.stats.ped_computations, outcome.stats.candidates);
        Ok((outcome.pairs(), stats))
    }

    /// `(name, name, score, infos)` for an id, or `None` if it is invalid.
    fn get_infos(&self, id: EntityId) -> PyResult<Option<InfoTuple>> {
        let entity = self.shared.get_info(id).map_err(query_err)?;
        Ok(entity.map(info_tuple))
    }

    fn normalize(&self, word: &str) -> String {
        algorithms::normalize(word)
    }

    fn compute_qgrams(&self, word: &str) -> Vec<String> {
        algorithms::compute_qgrams(word, self.config.q)
    }

    #[getter]
    fn q(&self) -> usize {
        self.config.q
    }

    #[getter]
    fn use_syns(&self) -> bool {
        self.config.use_synonyms
    }

    fn __len__(&self) -> usize {
        self.shared.snapshot().map_or(0, |index| index.len())
    }

    fn __repr__(&self) -> String {
        format!(
            "QGramIndex(q={}, use_syns={}, ready={})",
            self.config.q,
            self.config.use_synonyms,
            self.shared.is_ready()
        )
    }
}

/// Prefix edit distance of `x` against `y`, capped at `delta + 1`.
#[pyfunction]
fn ped(x: &str, y: &str, delta: usize) -> usize {
    algorithms::prefix_edit_distance(x, y, delta)
}

/// Merge sorted `(id, count)` lists, summing counts of shared ids.
#[pyfunction]
fn merge_lists(py: Python<'_>, lists: Vec<Vec<(EntityId, usize)>>) -> Vec<(EntityId, usize)> {
    py.allow_threads(|| {
        let lists: Vec<Vec<Posting>> = lists
            .into_iter()
            .map(|l| l.into_iter().map(Posting::from).collect())
            .collect();
        let refs: Vec<&[Posting]> = lists.iter().map(Vec::as_slice).collect();
        algorithms::merge_lists(&refs)
            .into_iter()
            .map(|p| (p.id, p.count))
            .collect()
    })
}

// ============================================================================
// Python Module
// ============================================================================

#[pymodule]
fn qgram_index(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    crate::init_logger();

    m.add("QGramIndexError", py.get_type::<QGramIndexError>())?;
    m.add("IndexBuildError", py.get_type::<IndexBuildError>())?;
    m.add("QueryValidationError", py.get_type::<QueryValidationError>())?;

    m.add_class::<PyQGramIndex>()?;
    m.add_function(wrap_pyfunction!(ped, m)?)?;
    m.add_function(wrap_pyfunction!(merge_lists, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexing::loader::parse_line;

    #[test]
    fn test_info_tuple_repeats_name() {
        let shared = SharedIndex::new();
        let records = vec![
            parse_line(2, "frei\t3\tFreiburg\tfirst entity\tused for doctests"),
            parse_line(3, "brei\t2\t\tsecond entity"),
        ];
        shared
            .build(IndexConfig::new(3).with_synonyms(true), records)
            .unwrap();

        let info = shared.get_info(1).unwrap().map(info_tuple);
        assert_eq!(
            info,
            Some((
                "frei".to_string(),
                "frei".to_string(),
                3,
                vec!["first entity".to_string(), "used for doctests".to_string()],
            ))
        );
        assert_eq!(shared.get_info(3).unwrap().map(info_tuple), None);
    }
}
