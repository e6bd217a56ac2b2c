//! Ranking of verified matches

use serde::{Deserialize, Serialize};

use super::entity::EntityStore;
use crate::algorithms::EntityId;

/// A candidate whose prefix edit distance is within the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub id: EntityId,
    pub distance: usize,
    /// Which indexed name achieved the distance (0 = primary name, `i` =
    /// synonym `i - 1`)
    pub name_index: usize,
}

impl Match {
    pub fn new(id: EntityId, distance: usize) -> Self {
        Self {
            id,
            distance,
            name_index: 0,
        }
    }
}

/// Sort by distance ascending, then popularity descending; truncate to `k`.
///
/// The sort is stable, so matches tied on both keys keep discovery order.
pub fn rank(mut matches: Vec<Match>, store: &EntityStore, k: Option<usize>) -> Vec<Match> {
    matches.sort_by_key(|m| (m.distance, std::cmp::Reverse(store.score(m.id))));
    if let Some(k) = k {
        matches.truncate(k);
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexing::entity::{Entity, Record};

    fn store(scores: &[i64]) -> EntityStore {
        let entities = scores
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let record = Record::new(i + 2, vec![format!("e{}", i + 1), score.to_string()]);
                Entity::from_record(i + 1, record).unwrap()
            })
            .collect();
        EntityStore::from_entities(entities)
    }

    fn ids(matches: &[Match]) -> Vec<usize> {
        matches.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_distance_then_score() {
        let store = store(&[5, 10, 1, 10]);
        let matches = vec![
            Match::new(1, 1),
            Match::new(2, 1),
            Match::new(3, 0),
            Match::new(4, 2),
        ];
        assert_eq!(ids(&rank(matches, &store, None)), vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let store = store(&[7, 7, 7]);
        let matches = vec![Match::new(3, 1), Match::new(1, 1), Match::new(2, 1)];
        assert_eq!(ids(&rank(matches, &store, None)), vec![3, 1, 2]);
    }

    #[test]
    fn test_truncate() {
        let store = store(&[1, 2, 3]);
        let matches = vec![Match::new(1, 0), Match::new(2, 0), Match::new(3, 0)];
        assert_eq!(ids(&rank(matches.clone(), &store, Some(2))), vec![3, 2]);
        assert!(rank(matches.clone(), &store, Some(0)).is_empty());
        assert_eq!(rank(matches, &store, Some(10)).len(), 3);
    }
}
