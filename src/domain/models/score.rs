//! Score domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{AcademicScope, EntityId, StudentId};
use super::mapping::{MappingMode, ResolvedWeight};
use super::tier::{Tier, TierTransition};

/// A stored score for one student on one entity of a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub student_id: StudentId,
    pub entity_id: EntityId,
    pub value: f64,
    pub updated_at: DateTime<Utc>,
}

/// A raw mark for one criterion, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkSubmission {
    pub student_id: StudentId,
    pub criterion_id: EntityId,
    pub obtained_marks: f64,
    pub scope: AcademicScope,
}

/// A computed parent-tier score awaiting commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentScore {
    pub student_id: StudentId,
    pub value: f64,
}

/// Everything one propagation run writes, applied as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationCommit {
    pub transition: TierTransition,
    pub parent_id: EntityId,
    pub mode: MappingMode,
    pub weights: Vec<ResolvedWeight>,
    pub scores: Vec<ParentScore>,
    pub computed_at: DateTime<Utc>,
}

impl PropagationCommit {
    pub const fn parent_tier(&self) -> Tier {
        self.transition.parent()
    }
}

/// Result of a successful propagation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationOutcome {
    pub run_id: uuid::Uuid,
    pub transition: TierTransition,
    pub parent_id: EntityId,
    pub students_processed: usize,
    /// Number of (student, child) pairs with no stored child score.
    pub missing_child_scores: usize,
}
