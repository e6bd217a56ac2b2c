//! Core string and posting-list algorithms
//!
//! Each algorithm is implemented as a standalone function for composability,
//! plus a trait-based interface where the index can swap implementations.

pub mod merge;
pub mod normalize;
pub mod ped;
pub mod qgram;

pub use merge::*;
pub use normalize::*;
pub use ped::*;
pub use qgram::*;

use serde::{Deserialize, Serialize};

/// Selects the merge and prefix-distance implementations used by the index.
///
/// Both backends satisfy the same contracts and produce identical query
/// results; they differ only in cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Pairwise list merge and full-table PED
    Reference,
    /// Heap-based k-way merge and banded PED
    #[default]
    Accelerated,
}

impl Backend {
    /// Posting list merger for this backend
    #[must_use]
    pub fn merger(self) -> &'static dyn PostingMerger {
        match self {
            Backend::Reference => &PairwiseMerge,
            Backend::Accelerated => &HeapMerge,
        }
    }

    /// Prefix distance evaluator for this backend
    #[must_use]
    pub fn prefix_distance(self) -> &'static dyn PrefixDistance {
        match self {
            Backend::Reference => &FullPrefixDistance,
            Backend::Accelerated => &BandedPrefixDistance,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Backend::Reference => "reference",
            Backend::Accelerated => "accelerated",
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reference" | "ref" => Ok(Backend::Reference),
            "accelerated" | "fast" => Ok(Backend::Accelerated),
            other => Err(format!(
                "unknown backend '{other}', expected 'reference' or 'accelerated'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection() {
        assert_eq!(Backend::Reference.merger().name(), "pairwise");
        assert_eq!(Backend::Accelerated.merger().name(), "heap");
        assert_eq!(Backend::Reference.prefix_distance().name(), "full");
        assert_eq!(Backend::Accelerated.prefix_distance().name(), "banded");
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Reference".parse::<Backend>(), Ok(Backend::Reference));
        assert_eq!("fast".parse::<Backend>(), Ok(Backend::Accelerated));
        assert!("simd".parse::<Backend>().is_err());
    }
}
