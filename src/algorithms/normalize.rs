//! String normalization
//!
//! Maps arbitrary text to the canonical form used for both indexing and
//! querying: every character that is not a word character is dropped and
//! the survivors are lowercased and concatenated.

/// Whether `c` counts as a word character (letter, digit, or underscore).
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Normalize a string for q-gram indexing.
///
/// Lowercasing happens before the word-character test, so characters whose
/// lowercase expansion contains non-word marks (e.g. `'İ'`) keep only their
/// word parts. This makes the function idempotent.
///
/// # Example
/// ```
/// use qgram_index::algorithms::normalize::normalize;
///
/// assert_eq!(normalize("Frei, burG !?!"), "freiburg");
/// assert_eq!(normalize("Frei14burg"), "frei14burg");
/// ```
#[must_use]
pub fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .filter(|&c| is_word_char(c))
        .collect()
}

/// Normalize into a char buffer, for callers that work on scalar values.
#[must_use]
pub fn normalize_chars(s: &str) -> Vec<char> {
    s.chars()
        .flat_map(char::to_lowercase)
        .filter(|&c| is_word_char(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_already_normalized() {
        assert_eq!(normalize("freiburg"), "freiburg");
    }

    #[test]
    fn test_punctuation_and_case() {
        assert_eq!(normalize("Frei, burG !?!"), "freiburg");
        assert_eq!(normalize("Frei14burg"), "frei14burg");
        assert_eq!(normalize("snake_case"), "snake_case");
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  ,;!? "), "");
    }

    #[test]
    fn test_unicode_letters_survive() {
        assert_eq!(normalize("Eyjafjallajökull"), "eyjafjallajökull");
        assert_eq!(normalize("Ärger Über"), "ärgerüber");
    }

    #[test]
    fn test_dotted_capital_i() {
        // 'İ' lowercases to 'i' followed by a combining dot
        assert_eq!(normalize("İstanbul"), "istanbul");
    }

    #[test]
    fn test_chars_matches_string() {
        let s = "Albert Einstein (1879)";
        assert_eq!(normalize_chars(s).into_iter().collect::<String>(), normalize(s));
    }

    proptest! {
        #[test]
        fn prop_idempotent(s in "\\PC{0,24}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_output_is_word_chars(s in "\\PC{0,24}") {
            prop_assert!(normalize(&s).chars().all(is_word_char));
        }
    }
}
