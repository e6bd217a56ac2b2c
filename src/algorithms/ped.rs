//! Prefix edit distance (PED)
//!
//! `PED(x, y)` is the minimum number of single-character insertions,
//! deletions and substitutions that turn `x` into *some prefix* of `y`.
//! The query `x` has to be matched completely, while `y` may have an
//! arbitrary unmatched suffix.
//!
//! Optimized with:
//! - Banded DP restricted to the `2·δ+1` diagonals that can hold values ≤ δ
//! - Early termination once a whole row exceeds δ
//! - Unicode-aware character handling

use smallvec::SmallVec;

/// Trait for bounded prefix edit distance implementations.
///
/// Contract shared by every implementation: the result is `≤ delta` exactly
/// when the true prefix edit distance is `≤ delta`, and then equals it.
/// Otherwise any value `> delta` may be returned.
pub trait PrefixDistance: Send + Sync {
    fn distance(&self, x: &[char], y: &[char], delta: usize) -> usize;

    /// Name of the algorithm for debugging/logging
    fn name(&self) -> &'static str;
}

/// Reference implementation: full `|x| × |y|` DP table, single row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullPrefixDistance;

impl PrefixDistance for FullPrefixDistance {
    fn distance(&self, x: &[char], y: &[char], _delta: usize) -> usize {
        ped_full(x, y)
    }

    fn name(&self) -> &'static str {
        "full"
    }
}

/// Accelerated implementation: banded DP, O(|x| · δ).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandedPrefixDistance;

impl PrefixDistance for BandedPrefixDistance {
    fn distance(&self, x: &[char], y: &[char], delta: usize) -> usize {
        ped_banded(x, y, delta)
    }

    fn name(&self) -> &'static str {
        "banded"
    }
}

/// Exact, uncapped prefix edit distance.
#[inline]
fn ped_full(x: &[char], y: &[char]) -> usize {
    if x.is_empty() {
        return 0;
    }

    // row[j] = ED(x[..i], y[..j])
    let mut row: SmallVec<[usize; 64]> = (0..=y.len()).collect();

    for (i, &xc) in x.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;

        for (j, &yc) in y.iter().enumerate() {
            let cost = usize::from(xc != yc);
            let deletion = row[j + 1] + 1;
            let insertion = row[j] + 1;
            let substitution = prev + cost;

            prev = row[j + 1];
            row[j + 1] = substitution.min(deletion).min(insertion);
        }
    }

    row.iter().copied().min().unwrap_or(x.len())
}

/// Banded prefix edit distance capped at `delta + 1`.
///
/// Cell `(i, j)` of the full table is stored at band offset
/// `k = j + delta - i`; cells with `|i - j| > delta` hold at least
/// `delta + 1` and are never materialized.
///
/// The distance never exceeds `|x|` (delete all of `x`), so `delta` is
/// clamped to it before the band is sized.
#[inline]
fn ped_banded(x: &[char], y: &[char], delta: usize) -> usize {
    let delta = delta.min(x.len());
    let cap = delta + 1;
    if x.is_empty() {
        return 0;
    }
    if x.len() > y.len() + delta {
        return cap;
    }

    let width = 2 * delta + 1;
    let mut prev: SmallVec<[usize; 16]> = SmallVec::from_elem(cap, width);
    let mut curr: SmallVec<[usize; 16]> = SmallVec::from_elem(cap, width);

    // Row 0: ED("", y[..j]) = j
    for j in 0..=y.len().min(delta) {
        prev[j + delta] = j;
    }

    for i in 1..=x.len() {
        curr.iter_mut().for_each(|cell| *cell = cap);
        let mut row_min = cap;
        let lo = i.saturating_sub(delta);
        let hi = (i + delta).min(y.len());

        for j in lo..=hi {
            let k = j + delta - i;
            let mut best = cap;

            // Delete x[i-1]: (i-1, j)
            if k + 1 < width {
                best = best.min(prev[k + 1] + 1);
            }
            if j > 0 {
                // Substitute or match: (i-1, j-1)
                let cost = usize::from(x[i - 1] != y[j - 1]);
                best = best.min(prev[k] + cost);
                // Insert y[j-1]: (i, j-1)
                if k > 0 {
                    best = best.min(curr[k - 1] + 1);
                }
            }

            curr[k] = best.min(cap);
            row_min = row_min.min(curr[k]);
        }

        if row_min > delta {
            return cap;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev.iter().copied().min().unwrap_or(cap).min(cap)
}

/// Compute the prefix edit distance of `x` against `y`, capped at
/// `delta + 1`.
///
/// # Example
/// ```
/// use qgram_index::algorithms::ped::prefix_edit_distance;
///
/// assert_eq!(prefix_edit_distance("frei", "frei", 0), 0);
/// assert_eq!(prefix_edit_distance("frei", "freiburg", 0), 0);
/// assert_eq!(prefix_edit_distance("frei", "brei", 1), 1);
/// assert_eq!(prefix_edit_distance("freib", "brei", 1), 2);
/// ```
#[inline]
#[must_use]
pub fn prefix_edit_distance(x: &str, y: &str, delta: usize) -> usize {
    let x_chars: SmallVec<[char; 64]> = x.chars().collect();
    let y_chars: SmallVec<[char; 64]> = y.chars().collect();
    ped_banded(&x_chars, &y_chars, delta)
}

/// Exact prefix edit distance without any cap.
#[must_use]
pub fn prefix_edit_distance_unbounded(x: &str, y: &str) -> usize {
    let x_chars: SmallVec<[char; 64]> = x.chars().collect();
    let y_chars: SmallVec<[char; 64]> = y.chars().collect();
    ped_full(&x_chars, &y_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_ped_examples() {
        assert_eq!(prefix_edit_distance("frei", "frei", 0), 0);
        assert_eq!(prefix_edit_distance("frei", "brei", 0), 1);
        assert_eq!(prefix_edit_distance("frei", "brei", 1), 1);
        assert_eq!(prefix_edit_distance("freib", "frei", 1), 1);
        assert_eq!(prefix_edit_distance("freib", "brei", 1), 2);
    }

    #[test]
    fn test_free_suffix() {
        assert_eq!(prefix_edit_distance_unbounded("uni", "university"), 0);
        assert_eq!(prefix_edit_distance_unbounded("uniz", "university"), 1);
        assert_eq!(prefix_edit_distance_unbounded("university", "uni"), 7);
    }

    #[test]
    fn test_lecture_example() {
        assert_eq!(prefix_edit_distance_unbounded("shwartz", "schwarzenegger"), 2);
        assert_eq!(prefix_edit_distance("shwartz", "schwarzenegger", 2), 2);
        assert!(prefix_edit_distance("shwartz", "schwarzenegger", 1) > 1);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(prefix_edit_distance("", "anything", 0), 0);
        assert_eq!(prefix_edit_distance("abc", "", 3), 3);
        assert!(prefix_edit_distance("abc", "", 2) > 2);
        assert_eq!(prefix_edit_distance_unbounded("abc", ""), 3);
    }

    #[test]
    fn test_huge_delta() {
        assert_eq!(prefix_edit_distance("abc", "abd", usize::MAX), 1);
        assert_eq!(prefix_edit_distance("abc", "abd", 1 << 40), 1);
        assert_eq!(prefix_edit_distance("abc", "", usize::MAX), 3);
        assert_eq!(BandedPrefixDistance.distance(&[], &chars("x"), usize::MAX), 0);
    }

    #[test]
    fn test_unicode() {
        assert_eq!(prefix_edit_distance("eyjä", "eyjafjallajökull", 1), 1);
        assert_eq!(prefix_edit_distance("jök", "jökull", 0), 0);
    }

    #[test]
    fn test_implementations_agree_on_cap() {
        let full = FullPrefixDistance;
        let banded = BandedPrefixDistance;
        let x = chars("kitten");
        let y = chars("sitting");
        assert_eq!(full.distance(&x, &y, 1), 2);
        assert!(banded.distance(&x, &y, 1) > 1);
        assert_eq!(banded.distance(&x, &y, 2), 2);
    }

    proptest! {
        #[test]
        fn prop_banded_matches_reference_within_cap(
            x in "[abc]{0,8}",
            y in "[abc]{0,10}",
            delta in 0usize..4,
        ) {
            let exact = prefix_edit_distance_unbounded(&x, &y);
            let capped = prefix_edit_distance(&x, &y, delta);
            if exact <= delta {
                prop_assert_eq!(capped, exact);
            } else {
                prop_assert!(capped > delta);
            }
        }

        #[test]
        fn prop_deterministic(x in "[a-e]{0,8}", y in "[a-e]{0,8}", delta in 0usize..3) {
            prop_assert_eq!(
                prefix_edit_distance(&x, &y, delta),
                prefix_edit_distance(&x, &y, delta)
            );
        }
    }
}
