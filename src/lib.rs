//! qgram-index - Fuzzy prefix search over named entities
//!
//! Finds the entities whose name is within a given prefix edit distance of a
//! typed (possibly incomplete, possibly misspelled) query, ranked by distance
//! and popularity.
//!
//! # Features
//! - Inverted q-gram index built in a single pass, optionally sharded
//! - Pigeonhole overlap filter that prunes candidates before any distance work
//! - Banded prefix edit distance with early termination
//! - Lock-free concurrent queries on a built index
//! - Optional Python bindings (`python` feature)
//!
//! # Example
//!
//! ```
//! use qgram_index::indexing::{IndexConfig, QGramIndex};
//! use qgram_index::indexing::loader::parse_line;
//!
//! let records = vec![parse_line(2, "frei\t3"), parse_line(3, "brei\t2")];
//! let index = QGramIndex::build(IndexConfig::new(3), records).unwrap();
//!
//! let outcome = index.find_matches("frei", 1).unwrap();
//! assert_eq!(outcome.pairs(), vec![(1, 0), (2, 1)]);
//! assert_eq!(index.get_info(2).unwrap().name, "brei");
//! ```

#[macro_use]
extern crate log;

pub mod algorithms;
pub mod indexing;

#[cfg(feature = "python")]
mod python;

pub use algorithms::{
    compute_qgrams, normalize, prefix_edit_distance, Backend, EntityId, Posting,
};
pub use indexing::{
    BuildError, Entity, IndexConfig, Match, QGramIndex, QueryError, QueryOutcome, QueryStats,
    SharedIndex,
};

/// Initialize the logger.
/// Safe to call more than once; only the first call has an effect.
///
/// The log level is controlled via the RUST_LOG environment variable:
/// - RUST_LOG=qgram_index=debug (per-query statistics)
/// - RUST_LOG=qgram_index=trace (shard details during parallel builds)
pub fn init_logger() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // Another logger may already be installed by the host application
        let _ = env_logger::try_init();
        debug!("qgram-index logging initialized");
    });
}
