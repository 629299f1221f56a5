use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EntityId, ScoreRecord, StudentId, Tier};
use crate::domain::ports::ScoreRepository;

/// Read side of the per-tier score tables.
pub struct ScoreReader {
    scores: Arc<dyn ScoreRepository>,
}

impl ScoreReader {
    pub fn new(scores: Arc<dyn ScoreRepository>) -> Self {
        Self { scores }
    }

    /// Scores for a student on one tier, optionally narrowed to one entity.
    ///
    /// An empty result is reported as `NotFound`.
    pub async fn scores_for(
        &self,
        tier: Tier,
        student_id: StudentId,
        entity_id: Option<EntityId>,
    ) -> DomainResult<Vec<ScoreRecord>> {
        let scores = self.scores.for_student(tier, student_id, entity_id).await?;
        if scores.is_empty() {
            let detail = match entity_id {
                Some(id) => format!(" and {}={id}", tier.id_column()),
                None => String::new(),
            };
            return Err(DomainError::NotFound(format!(
                "No {tier} scores found for student_id={student_id}{detail}"
            )));
        }
        Ok(scores)
    }
}
