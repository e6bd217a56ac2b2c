//! Candidate filtering by q-gram overlap
//!
//! A prefix of `n` chars produces `n` padded grams, and one edit can destroy
//! at most `q` of them. A name within `δ` edits of the prefix therefore
//! shares at least `n - q·δ` grams with it, and every candidate below that
//! count can be dropped without computing its edit distance.

use crate::algorithms::Posting;

/// Minimum overlap count a match within `delta` edits must reach.
///
/// Returns `None` when the bound is not positive. The filter cannot prune
/// anything in that case and callers reject the query instead.
#[inline]
#[must_use]
pub fn threshold(prefix_len: usize, q: usize, delta: usize) -> Option<usize> {
    let lost = q.checked_mul(delta)?;
    prefix_len.checked_sub(lost).filter(|&t| t > 0)
}

/// Default tolerance for interactive queries: one edit per `q + 1` chars.
///
/// Always yields a positive [`threshold`] for a non-empty prefix.
#[inline]
#[must_use]
pub fn default_delta(prefix_len: usize, q: usize) -> usize {
    prefix_len / (q + 1)
}

/// Keep the candidates whose overlap count reaches `threshold`.
pub fn filter_candidates(candidates: &[Posting], threshold: usize) -> Vec<Posting> {
    candidates
        .iter()
        .filter(|c| c.count >= threshold)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        assert_eq!(threshold(4, 3, 0), Some(4));
        assert_eq!(threshold(4, 3, 1), Some(1));
        assert_eq!(threshold(5, 3, 1), Some(2));
        assert_eq!(threshold(3, 3, 1), None);
        assert_eq!(threshold(2, 3, 1), None);
        assert_eq!(threshold(0, 3, 0), None);
        assert_eq!(threshold(10, usize::MAX, 2), None);
    }

    #[test]
    fn test_default_delta_keeps_threshold_positive() {
        for q in 1..6 {
            for len in 1..40 {
                let delta = default_delta(len, q);
                assert!(threshold(len, q, delta).is_some(), "len={len} q={q}");
            }
        }
        assert_eq!(default_delta(8, 3), 2);
    }

    #[test]
    fn test_filter_candidates() {
        let candidates = vec![Posting::new(1, 4), Posting::new(2, 1), Posting::new(5, 2)];
        assert_eq!(
            filter_candidates(&candidates, 2),
            vec![Posting::new(1, 4), Posting::new(5, 2)]
        );
        assert_eq!(filter_candidates(&candidates, 1).len(), 3);
        assert!(filter_candidates(&candidates, 5).is_empty());
    }
}
