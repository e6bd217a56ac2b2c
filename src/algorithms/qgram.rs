//! Q-gram extraction
//!
//! Slides a window of width `q` over a normalized string that has been
//! padded on the left with `q - 1` sentinel characters. The sentinel grams
//! encode the start of the string, which is what makes prefix queries work.
//!
//! # Q-gram Size Limits
//!
//! Valid sizes are in the range 1-32 (inclusive). The index configuration
//! rejects anything outside this range before extraction is ever called.

/// Maximum valid q-gram size.
pub const MAX_QGRAM_SIZE: usize = 32;

/// Padding character. Never produced by normalization, which keeps word
/// characters only.
pub const PAD_CHAR: char = '$';

/// Q-gram extractor with a fixed width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QGramExtractor {
    q: usize,
}

impl QGramExtractor {
    /// Create an extractor for grams of width `q`.
    ///
    /// `q` must be in `1..=MAX_QGRAM_SIZE`; the caller validates it.
    #[must_use]
    pub fn new(q: usize) -> Self {
        debug_assert!((1..=MAX_QGRAM_SIZE).contains(&q), "invalid q-gram size {q}");
        Self { q }
    }

    /// Gram width
    #[must_use]
    pub fn q(&self) -> usize {
        self.q
    }

    /// Extract the padded q-grams of a normalized string, in order,
    /// duplicates included.
    #[must_use]
    pub fn extract(&self, s: &str) -> Vec<String> {
        compute_qgrams(s, self.q)
    }
}

impl Default for QGramExtractor {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Compute the q-grams of the left-padded version of `s`.
///
/// A string of `n` chars yields exactly `n` grams; the empty string yields
/// none. Returns an empty vec for `q == 0`.
///
/// # Example
/// ```
/// use qgram_index::algorithms::qgram::compute_qgrams;
///
/// assert_eq!(
///     compute_qgrams("freiburg", 3),
///     vec!["$$f", "$fr", "fre", "rei", "eib", "ibu", "bur", "urg"]
/// );
/// assert_eq!(compute_qgrams("f", 3), vec!["$$f"]);
/// assert!(compute_qgrams("", 3).is_empty());
/// ```
#[must_use]
pub fn compute_qgrams(s: &str, q: usize) -> Vec<String> {
    if q == 0 || s.is_empty() {
        return vec![];
    }

    let char_count = s.chars().count();
    let mut chars = Vec::with_capacity(char_count + q - 1);
    chars.extend(std::iter::repeat(PAD_CHAR).take(q - 1));
    chars.extend(s.chars());

    chars.windows(q).map(|w| w.iter().collect()).collect()
}
