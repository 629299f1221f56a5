//! Hierarchical score propagation.
//!
//! One engine serves both tier edges (criteria → learning outcome and
//! learning outcomes → report outcome). A run for one parent:
//!
//! 1. takes the parent's lock so concurrent runs for it serialize,
//! 2. validates the parent, the children and the cohort,
//! 3. resolves priority weights for the batch,
//! 4. reads every stored child score for the cohort in bulk,
//! 5. computes each student's parent score in memory,
//! 6. commits mappings and scores in a single transaction.
//!
//! Steps 1 to 5 never write. A failed commit leaves no trace.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use super::parent_locks::ParentLocks;
use super::priority_weights::PriorityWeightResolver;
use super::reference_validator::ReferenceValidator;
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Cohort, EntityId, MappingBatch, MappingMode, ParentScore, PropagationCommit,
    PropagationOutcome, ResolvedWeight, ScoreRecord, StudentId, TermScope, TierTransition,
};
use crate::domain::ports::{CatalogRepository, MappingRepository, ScoreRepository};

/// A mapping batch together with the scopes it was submitted under.
#[derive(Debug, Clone)]
pub struct PropagationRequest {
    pub transition: TierTransition,
    pub batch: MappingBatch,
    pub term: TermScope,
    pub cohort: Cohort,
}

/// Parent scores for a cohort, plus how many child scores were absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub scores: Vec<ParentScore>,
    pub missing: usize,
}

/// Weighted sum of child scores per student.
///
/// Only the given weights are used. A child score missing for a student
/// contributes zero; the student is still scored.
pub fn aggregate(
    students: &[StudentId],
    weights: &[ResolvedWeight],
    child_scores: &[ScoreRecord],
) -> Aggregation {
    let lookup: HashMap<(StudentId, EntityId), f64> = child_scores
        .iter()
        .map(|s| ((s.student_id, s.entity_id), s.value))
        .collect();

    let mut missing = 0;
    let scores = students
        .iter()
        .map(|&student_id| {
            let mut value = 0.0;
            for w in weights {
                match lookup.get(&(student_id, w.child_id)) {
                    Some(child) => value += w.weight * child,
                    None => {
                        missing += 1;
                        tracing::warn!(
                            student_id = %student_id,
                            child_id = %w.child_id,
                            "missing child score, counted as zero"
                        );
                    }
                }
            }
            ParentScore { student_id, value }
        })
        .collect();

    Aggregation { scores, missing }
}

pub struct PropagationEngine {
    validator: ReferenceValidator,
    resolver: PriorityWeightResolver,
    scores: Arc<dyn ScoreRepository>,
    mappings: Arc<dyn MappingRepository>,
    locks: ParentLocks,
    mode: MappingMode,
}

impl PropagationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        scores: Arc<dyn ScoreRepository>,
        mappings: Arc<dyn MappingRepository>,
        resolver: PriorityWeightResolver,
        mode: MappingMode,
    ) -> Self {
        Self {
            validator: ReferenceValidator::new(catalog),
            resolver,
            scores,
            mappings,
            locks: ParentLocks::new(),
            mode,
        }
    }

    pub const fn mode(&self) -> MappingMode {
        self.mode
    }

    /// Run one propagation and report how many students were scored.
    pub async fn propagate(&self, request: PropagationRequest) -> DomainResult<PropagationOutcome> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "propagate",
            %run_id,
            transition = %request.transition,
            parent_id = %request.batch.parent_id(),
            children = request.batch.entries().len(),
            mode = self.mode.as_str(),
        );
        self.run(run_id, request).instrument(span).await
    }

    async fn run(&self, run_id: Uuid, request: PropagationRequest) -> DomainResult<PropagationOutcome> {
        let PropagationRequest {
            transition,
            batch,
            term,
            cohort,
        } = request;
        let parent_id = batch.parent_id();

        let _guard = self.locks.acquire(transition, parent_id).await;

        let students = self.validator.validate(transition, &batch, &term, &cohort).await?;
        let weights = self.resolver.resolve(batch.entries())?;

        let child_scores = self
            .scores
            .for_cohort(transition.child(), &students, &batch.child_ids())
            .await?;
        let Aggregation { scores, missing } = aggregate(&students, &weights, &child_scores);

        let commit = PropagationCommit {
            transition,
            parent_id,
            mode: self.mode,
            weights,
            scores,
            computed_at: Utc::now(),
        };
        if let Err(err) = self.mappings.commit(&commit).await {
            tracing::error!(error = %err, "propagation commit failed, nothing written");
            return Err(err);
        }

        tracing::info!(
            students = students.len(),
            missing_child_scores = missing,
            "propagation committed"
        );

        Ok(PropagationOutcome {
            run_id,
            transition,
            parent_id,
            students_processed: students.len(),
            missing_child_scores: missing,
        })
    }
}
