//! Indexing structures for fuzzy prefix search
//!
//! - Entities: validated records and the id → entity store
//! - Loader: tab-separated record input
//! - Postings: the inverted q-gram lists, sequential or sharded build
//! - Filter / rank: overlap pruning and result ordering
//! - Q-gram index: the ready, queryable index
//! - Thread-safe wrapper: building/ready handle shared across threads

pub mod entity;
pub mod filter;
pub mod loader;
pub mod postings;
pub mod qgram_index;
pub mod rank;
pub mod threadsafe;

pub use entity::*;
pub use filter::*;
pub use postings::*;
pub use qgram_index::*;
pub use rank::*;
pub use threadsafe::*;
