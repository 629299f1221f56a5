//! Administrative create/list operations for the scored catalog.

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AcademicScope, AssessmentCriterion, Cohort, EntityId, LearningOutcome, MappingRecord,
    ReportOutcome, Student, TierTransition,
};
use crate::domain::ports::{CatalogRepository, MappingRepository};

pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    mappings: Arc<dyn MappingRepository>,
}

fn required_name(name: &str, what: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(format!("{what} name must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn non_empty<T>(items: Vec<T>, message: impl FnOnce() -> String) -> DomainResult<Vec<T>> {
    if items.is_empty() {
        Err(DomainError::NotFound(message()))
    } else {
        Ok(items)
    }
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogRepository>, mappings: Arc<dyn MappingRepository>) -> Self {
        Self { catalog, mappings }
    }

    pub async fn register_student(&self, name: &str, cohort: &Cohort) -> DomainResult<Student> {
        let name = required_name(name, "Student")?;
        let student = self.catalog.create_student(&name, cohort).await?;
        tracing::info!(student_id = %student.id, %cohort, "student registered");
        Ok(student)
    }

    pub async fn students_in(&self, cohort: &Cohort) -> DomainResult<Vec<Student>> {
        let students = self.catalog.list_students(cohort).await?;
        non_empty(students, || format!("No students found for {cohort}"))
    }

    pub async fn define_criterion(
        &self,
        name: &str,
        max_marks: f64,
        scope: &AcademicScope,
    ) -> DomainResult<AssessmentCriterion> {
        let name = required_name(name, "Assessment criterion")?;
        if !max_marks.is_finite() || max_marks <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "max_marks must be a positive number, got {max_marks}"
            )));
        }
        let criterion = self.catalog.create_criterion(&name, max_marks, scope).await?;
        tracing::info!(ac_id = %criterion.id, max_marks, "assessment criterion defined");
        Ok(criterion)
    }

    pub async fn criteria_in(&self, scope: &AcademicScope) -> DomainResult<Vec<AssessmentCriterion>> {
        let criteria = self.catalog.list_criteria(scope).await?;
        non_empty(criteria, || {
            format!(
                "No assessment criteria found for subject={} year={} quarter={}",
                scope.subject, scope.year, scope.quarter
            )
        })
    }

    pub async fn define_learning_outcome(
        &self,
        name: &str,
        scope: &AcademicScope,
    ) -> DomainResult<LearningOutcome> {
        let name = required_name(name, "Learning outcome")?;
        let outcome = self.catalog.create_learning_outcome(&name, scope).await?;
        tracing::info!(lo_id = %outcome.id, "learning outcome defined");
        Ok(outcome)
    }

    pub async fn learning_outcomes_in(&self, scope: &AcademicScope) -> DomainResult<Vec<LearningOutcome>> {
        let outcomes = self.catalog.list_learning_outcomes(scope).await?;
        non_empty(outcomes, || {
            format!(
                "No learning outcomes found for subject={} year={} quarter={}",
                scope.subject, scope.year, scope.quarter
            )
        })
    }

    pub async fn define_report_outcome(&self, name: &str) -> DomainResult<ReportOutcome> {
        let name = required_name(name, "Report outcome")?;
        let outcome = self.catalog.create_report_outcome(&name).await?;
        tracing::info!(ro_id = %outcome.id, "report outcome defined");
        Ok(outcome)
    }

    pub async fn report_outcomes(&self) -> DomainResult<Vec<ReportOutcome>> {
        let outcomes = self.catalog.list_report_outcomes().await?;
        non_empty(outcomes, || "No report outcomes found".to_string())
    }

    /// Stored mapping rows for a parent.
    pub async fn mappings_for(
        &self,
        transition: TierTransition,
        parent_id: EntityId,
    ) -> DomainResult<Vec<MappingRecord>> {
        let rows = self.mappings.for_parent(transition, parent_id).await?;
        non_empty(rows, || {
            format!(
                "No mappings found for {}={parent_id}",
                transition.parent().id_column()
            )
        })
    }
}
