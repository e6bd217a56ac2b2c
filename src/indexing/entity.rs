//! Entities and the immutable id → entity store
//!
//! Raw records are validated into [`Entity`] values while the index is being
//! built. Any malformed record aborts the build with a [`BuildError`] that
//! names the offending line.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithms::EntityId;

/// Separator between synonyms in the synonym field
pub const SYNONYM_SEPARATOR: char = ';';

/// Errors that abort index construction
#[derive(Error, Debug)]
pub enum BuildError {
    /// Record has fewer than the two mandatory fields (name, score)
    #[error("line {line}: expected at least 2 tab-separated fields, found {found}")]
    MissingFields { line: usize, found: usize },

    /// Score field is not an integer
    #[error("line {line}: invalid score '{value}'")]
    InvalidScore { line: usize, value: String },

    /// Index configuration rejected before any record was read
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The shared handle already serves a published index
    #[error("index is already built")]
    AlreadyBuilt,

    /// Reading the input failed
    #[error("failed to read records: {0}")]
    Io(#[from] std::io::Error),
}

/// A raw record: the tab-separated fields of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based physical line number in the source (header is line 1)
    pub line: usize,
    pub fields: Vec<String>,
}

impl Record {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }
}

/// An indexed entity. Immutable once the index is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// 1-based id, assigned in input order
    pub id: EntityId,
    pub name: String,
    pub score: i64,
    pub synonyms: Vec<String>,
    /// Auxiliary fields in input order (e.g. external id, description, URL)
    pub infos: Vec<String>,
}

impl Entity {
    /// Validate a record and turn it into the entity with the given id.
    ///
    /// Field layout: `name \t score \t synonyms \t info1 \t info2 ...`
    pub fn from_record(id: EntityId, record: Record) -> Result<Self, BuildError> {
        let Record { line, fields } = record;
        if fields.len() < 2 {
            return Err(BuildError::MissingFields {
                line,
                found: fields.len(),
            });
        }

        let mut fields = fields.into_iter();
        let name = fields.next().unwrap_or_default();
        let raw_score = fields.next().unwrap_or_default();
        let score = raw_score
            .trim()
            .parse::<i64>()
            .map_err(|_| BuildError::InvalidScore {
                line,
                value: raw_score.clone(),
            })?;
        let synonyms = fields
            .next()
            .map(|s| {
                s.split(SYNONYM_SEPARATOR)
                    .map(str::trim)
                    .filter(|syn| !syn.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let infos = fields.collect();

        Ok(Self {
            id,
            name,
            score,
            synonyms,
            infos,
        })
    }

    /// The texts indexed for this entity: the name, then the synonyms when
    /// requested. Position 0 is always the primary name.
    pub fn indexed_names(&self, use_synonyms: bool) -> impl Iterator<Item = &str> {
        let synonyms = if use_synonyms { self.synonyms.as_slice() } else { &[] };
        std::iter::once(self.name.as_str()).chain(synonyms.iter().map(String::as_str))
    }

    /// Auxiliary field by position
    pub fn info(&self, index: usize) -> Option<&str> {
        self.infos.get(index).map(String::as_str)
    }
}

/// Immutable id → entity lookup. O(1) by position.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
}

impl EntityStore {
    /// Build the store from entities whose ids are `1..=n` in order.
    pub(crate) fn from_entities(entities: Vec<Entity>) -> Self {
        debug_assert!(entities.iter().enumerate().all(|(i, e)| e.id == i + 1));
        Self { entities }
    }

    /// Get the entity with the given id, or `None` for unknown ids.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        id.checked_sub(1).and_then(|idx| self.entities.get(idx))
    }

    /// Popularity score of an entity; unknown ids rank last.
    pub fn score(&self, id: EntityId) -> i64 {
        self.get(id).map_or(i64::MIN, |e| e.score)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn par_iter(&self) -> impl IndexedParallelIterator<Item = &Entity> {
        self.entities.par_iter()
    }
}
