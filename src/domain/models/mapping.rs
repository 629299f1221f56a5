//! Mapping domain model.
//!
//! A mapping batch ties one parent entity to a list of children, each with a
//! qualitative priority. Priorities become normalized weights when the batch
//! is resolved.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::EntityId;
use crate::domain::errors::{DomainError, DomainResult};

/// Qualitative weight class of a mapped child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "h")]
    High,
    #[serde(rename = "m")]
    Medium,
    #[serde(rename = "l")]
    Low,
}

impl Priority {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "h",
            Self::Medium => "m",
            Self::Low => "l",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h" => Ok(Self::High),
            "m" => Ok(Self::Medium),
            "l" => Ok(Self::Low),
            other => Err(DomainError::InvalidInput(format!(
                "Invalid priority '{other}'. Must be 'h', 'm', or 'l'."
            ))),
        }
    }
}

/// One child of a mapping batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingEntry {
    pub child_id: EntityId,
    pub priority: Priority,
}

/// A parent id plus a non-empty list of children with distinct ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingBatch {
    parent_id: EntityId,
    entries: Vec<MappingEntry>,
}

impl MappingBatch {
    /// Build a batch from raw `(child_id, priority)` pairs.
    ///
    /// Rejects an empty list and any priority outside `h`/`m`/`l`. A child
    /// listed more than once keeps its first position and its last priority.
    pub fn parse<S: AsRef<str>>(
        parent_id: EntityId,
        raw: impl IntoIterator<Item = (EntityId, S)>,
    ) -> DomainResult<Self> {
        let mut position: HashMap<EntityId, usize> = HashMap::new();
        let mut entries: Vec<MappingEntry> = Vec::new();
        for (child_id, priority) in raw {
            let priority = priority.as_ref().parse::<Priority>()?;
            match position.get(&child_id) {
                Some(&i) => entries[i].priority = priority,
                None => {
                    position.insert(child_id, entries.len());
                    entries.push(MappingEntry { child_id, priority });
                }
            }
        }
        if entries.is_empty() {
            return Err(DomainError::InvalidInput(
                "Invalid data format. Expected a non-empty array of children with priorities."
                    .to_string(),
            ));
        }
        Ok(Self { parent_id, entries })
    }

    pub const fn parent_id(&self) -> EntityId {
        self.parent_id
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn child_ids(&self) -> Vec<EntityId> {
        self.entries.iter().map(|e| e.child_id).collect()
    }
}

/// A child id paired with its normalized weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWeight {
    pub child_id: EntityId,
    pub weight: f64,
}

/// How a submitted batch combines with mapping rows already stored for the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMode {
    /// Submitted rows are upserted; rows for omitted children stay.
    #[default]
    Merge,
    /// The batch becomes the parent's complete mapping set.
    Replace,
}

impl MappingMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Replace => "replace",
        }
    }
}

/// A stored mapping row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub parent_id: EntityId,
    pub child_id: EntityId,
    pub weight: f64,
    pub updated_at: DateTime<Utc>,
}
