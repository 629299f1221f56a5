//! Score repository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainResult;
use crate::domain::models::{EntityId, ScoreRecord, StudentId, Tier};

/// Repository interface for per-tier score tables.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Insert or overwrite the score at (student, entity).
    async fn upsert(
        &self,
        tier: Tier,
        student_id: StudentId,
        entity_id: EntityId,
        value: f64,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Scores for one student, optionally restricted to one entity, ordered by entity id.
    async fn for_student(
        &self,
        tier: Tier,
        student_id: StudentId,
        entity_id: Option<EntityId>,
    ) -> DomainResult<Vec<ScoreRecord>>;

    /// Every stored score for any of `students` on any of `entities`.
    ///
    /// Pairs without a stored row are simply absent from the result.
    async fn for_cohort(
        &self,
        tier: Tier,
        students: &[StudentId],
        entities: &[EntityId],
    ) -> DomainResult<Vec<ScoreRecord>>;
}
