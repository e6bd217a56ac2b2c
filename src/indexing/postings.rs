//! Inverted q-gram index: gram → posting list
//!
//! Lists are built in one pass over the entities in ascending id order. An
//! id is only ever appended after every smaller id has been processed, so
//! deduplication only has to look at a list's tail.
//!
//! The sharded build splits the entities into contiguous id ranges, builds
//! each range in parallel and concatenates the partial lists. Every list is
//! then re-sorted and folded explicitly before the index is handed out.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::algorithms::{EntityId, Posting, QGramExtractor};

/// Minimum number of entities for which the sharded build is used.
///
/// Below this, coordinating the thread pool costs more than it saves.
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Inverted lists of an index
#[derive(Debug, Clone, Default)]
pub struct PostingsIndex {
    lists: AHashMap<String, Vec<Posting>>,
}

/// Append one occurrence of `id` to a list, folding into the tail entry when
/// it already belongs to `id`.
#[inline]
fn append(list: &mut Vec<Posting>, id: EntityId) {
    match list.last_mut() {
        Some(last) if last.id == id => last.count += 1,
        _ => list.push(Posting::new(id, 1)),
    }
}

/// Sort a list by id and fold repeated ids into one posting.
fn sort_and_fold(list: &mut Vec<Posting>) {
    list.sort_by_key(|p| p.id);
    list.dedup_by(|next, kept| {
        if next.id == kept.id {
            kept.count += next.count;
            true
        } else {
            false
        }
    });
}

/// Build the partial lists of a contiguous id range.
///
/// `names[i]` holds the normalized indexed texts of entity `first_id + i`.
fn build_range(
    names: &[Vec<String>],
    first_id: EntityId,
    extractor: QGramExtractor,
) -> AHashMap<String, Vec<Posting>> {
    let mut lists: AHashMap<String, Vec<Posting>> = AHashMap::new();
    for (offset, entity_names) in names.iter().enumerate() {
        let id = first_id + offset;
        for name in entity_names {
            for gram in extractor.extract(name) {
                append(lists.entry(gram).or_default(), id);
            }
        }
    }
    lists
}

impl PostingsIndex {
    /// Build sequentially. `names[i]` holds the normalized indexed texts of
    /// entity `i + 1`.
    pub fn build(names: &[Vec<String>], extractor: QGramExtractor) -> Self {
        Self {
            lists: build_range(names, 1, extractor),
        }
    }

    /// Build with `num_shards` parallel workers over contiguous id ranges.
    pub fn build_sharded(
        names: &[Vec<String>],
        extractor: QGramExtractor,
        num_shards: usize,
    ) -> Self {
        let num_shards = num_shards.max(1);
        let shard_size = names.len().div_ceil(num_shards).max(1);

        let partials: Vec<AHashMap<String, Vec<Posting>>> = names
            .par_chunks(shard_size)
            .enumerate()
            .map(|(shard, chunk)| {
                trace!("building shard {} ({} entities)", shard, chunk.len());
                build_range(chunk, 1 + shard * shard_size, extractor)
            })
            .collect();

        let mut lists: AHashMap<String, Vec<Posting>> = AHashMap::new();
        for partial in partials {
            for (gram, postings) in partial {
                lists.entry(gram).or_default().extend(postings);
            }
        }
        for list in lists.values_mut() {
            sort_and_fold(list);
        }

        Self { lists }
    }

    /// Posting list of a gram
    pub fn get(&self, gram: &str) -> Option<&[Posting]> {
        self.lists.get(gram).map(Vec::as_slice)
    }

    /// Number of distinct grams
    pub fn num_grams(&self) -> usize {
        self.lists.len()
    }

    /// Total number of postings over all lists
    pub fn num_postings(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// Iterate over all `(gram, list)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.lists.iter().map(|(g, l)| (g.as_str(), l.as_slice()))
    }
}
