//! Posting list merging
//!
//! Combines several posting lists into one, summing the counts of ids that
//! appear in more than one list. Inputs must be sorted ascending by id with
//! unique ids; the output satisfies the same invariant.
//!
//! Two interchangeable implementations:
//! - [`PairwiseMerge`]: folds the lists two at a time with a linear
//!   merge-with-sum. O(k × total) in the worst case, simple and obviously
//!   correct.
//! - [`HeapMerge`]: k-way merge over a min-heap keyed by each list's current
//!   id. O(total × log k).
//!
//! The same list may be passed more than once; every occurrence contributes
//! its counts independently.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

/// 1-based entity identifier
pub type EntityId = usize;

/// One entry of a posting list: an entity id and how often the gram occurs
/// in that entity's indexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Posting {
    pub id: EntityId,
    pub count: usize,
}

impl Posting {
    #[inline]
    #[must_use]
    pub fn new(id: EntityId, count: usize) -> Self {
        Self { id, count }
    }
}

impl From<(EntityId, usize)> for Posting {
    fn from((id, count): (EntityId, usize)) -> Self {
        Self { id, count }
    }
}

/// Merge strategy for posting lists.
///
/// Implementations must produce identical output for identical input.
pub trait PostingMerger: Send + Sync {
    fn merge(&self, lists: &[&[Posting]]) -> Vec<Posting>;

    /// Name of the strategy for debugging/logging
    fn name(&self) -> &'static str;
}

/// Reference merge: repeated two-way merge-with-sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairwiseMerge;

impl PostingMerger for PairwiseMerge {
    fn merge(&self, lists: &[&[Posting]]) -> Vec<Posting> {
        let mut lists = lists.iter();
        let mut merged = match lists.next() {
            Some(first) => first.to_vec(),
            None => return Vec::new(),
        };
        for list in lists {
            merged = merge_pair(&merged, list);
        }
        merged
    }

    fn name(&self) -> &'static str {
        "pairwise"
    }
}

/// Accelerated merge: k-way fan-in over a binary heap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapMerge;

impl PostingMerger for HeapMerge {
    fn merge(&self, lists: &[&[Posting]]) -> Vec<Posting> {
        merge_lists(lists)
    }

    fn name(&self) -> &'static str {
        "heap"
    }
}

/// Merge two sorted posting lists, summing counts of shared ids.
///
/// # Example
/// ```
/// use qgram_index::algorithms::merge::{merge_pair, Posting};
///
/// let a = [Posting::new(1, 2), Posting::new(5, 3)];
/// let b = [Posting::new(1, 1), Posting::new(2, 1), Posting::new(6, 3)];
/// let merged = merge_pair(&a, &b);
/// assert_eq!(
///     merged,
///     vec![Posting::new(1, 3), Posting::new(2, 1), Posting::new(5, 3), Posting::new(6, 3)]
/// );
/// ```
#[must_use]
pub fn merge_pair(a: &[Posting], b: &[Posting]) -> Vec<Posting> {
    let mut result = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].id.cmp(&b[j].id) {
            std::cmp::Ordering::Less => {
                result.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                result.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                result.push(Posting::new(a[i].id, a[i].count + b[j].count));
                i += 1;
                j += 1;
            }
        }
    }

    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);
    result
}

/// K-way merge of sorted posting lists, summing counts of shared ids.
///
/// The heap holds one `(id, list)` cursor per non-exhausted list, so every
/// posting is pushed and popped exactly once.
#[must_use]
pub fn merge_lists(lists: &[&[Posting]]) -> Vec<Posting> {
    match lists.len() {
        0 => return Vec::new(),
        1 => return lists[0].to_vec(),
        2 => return merge_pair(lists[0], lists[1]),
        _ => {}
    }

    let total: usize = lists.iter().map(|l| l.len()).sum();
    let mut result: Vec<Posting> = Vec::with_capacity(total);
    let mut positions = vec![0usize; lists.len()];
    let mut heap: BinaryHeap<Reverse<(EntityId, usize)>> = lists
        .iter()
        .enumerate()
        .filter_map(|(list_idx, list)| list.first().map(|p| Reverse((p.id, list_idx))))
        .collect();

    while let Some(Reverse((id, list_idx))) = heap.pop() {
        let posting = lists[list_idx][positions[list_idx]];

        match result.last_mut() {
            Some(last) if last.id == id => last.count += posting.count,
            _ => result.push(posting),
        }

        positions[list_idx] += 1;
        if let Some(next) = lists[list_idx].get(positions[list_idx]) {
            heap.push(Reverse((next.id, list_idx)));
        }
    }

    result
}
