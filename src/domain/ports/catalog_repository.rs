//! Catalog repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AcademicScope, AssessmentCriterion, Cohort, EntityId, LearningOutcome, ReportOutcome, Student,
    StudentId, TermScope, Tier,
};

/// Repository interface for students, cohorts and scored entity definitions.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Find a criterion matching both the id and the full scope.
    async fn find_criterion(
        &self,
        id: EntityId,
        scope: &AcademicScope,
    ) -> DomainResult<Option<AssessmentCriterion>>;

    /// Whether an entity with this id exists in the tier's table.
    async fn entity_exists(&self, tier: Tier, id: EntityId) -> DomainResult<bool>;

    /// Return the subset of `ids` that exist in the tier's table and match the term.
    ///
    /// For unscoped tiers the term is ignored.
    async fn entities_in_term(
        &self,
        tier: Tier,
        ids: &[EntityId],
        term: &TermScope,
    ) -> DomainResult<Vec<EntityId>>;

    async fn student_exists(&self, id: StudentId) -> DomainResult<bool>;

    /// Distinct student ids with a record in the cohort, ascending.
    async fn cohort_student_ids(&self, cohort: &Cohort) -> DomainResult<Vec<StudentId>>;

    /// Create a student together with its cohort record.
    async fn create_student(&self, name: &str, cohort: &Cohort) -> DomainResult<Student>;

    async fn list_students(&self, cohort: &Cohort) -> DomainResult<Vec<Student>>;

    async fn create_criterion(
        &self,
        name: &str,
        max_marks: f64,
        scope: &AcademicScope,
    ) -> DomainResult<AssessmentCriterion>;

    async fn list_criteria(&self, scope: &AcademicScope) -> DomainResult<Vec<AssessmentCriterion>>;

    async fn create_learning_outcome(
        &self,
        name: &str,
        scope: &AcademicScope,
    ) -> DomainResult<LearningOutcome>;

    async fn list_learning_outcomes(
        &self,
        scope: &AcademicScope,
    ) -> DomainResult<Vec<LearningOutcome>>;

    async fn create_report_outcome(&self, name: &str) -> DomainResult<ReportOutcome>;

    async fn list_report_outcomes(&self) -> DomainResult<Vec<ReportOutcome>>;
}
