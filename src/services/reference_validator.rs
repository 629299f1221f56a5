//! Read-only reference checks run before a mapping batch mutates anything.

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Cohort, MappingBatch, StudentId, TermScope, TierTransition};
use crate::domain::ports::CatalogRepository;

pub struct ReferenceValidator {
    catalog: Arc<dyn CatalogRepository>,
}

impl ReferenceValidator {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Check the parent, every child and the cohort; return the cohort's students.
    ///
    /// Children are all-or-nothing: one unknown or out-of-term id rejects the
    /// whole batch. Nothing here guards against rows changing between this
    /// check and a later write.
    pub async fn validate(
        &self,
        transition: TierTransition,
        batch: &MappingBatch,
        term: &TermScope,
        cohort: &Cohort,
    ) -> DomainResult<Vec<StudentId>> {
        let parent_tier = transition.parent();
        if !self.catalog.entity_exists(parent_tier, batch.parent_id()).await? {
            return Err(DomainError::NotFound(format!(
                "Invalid {} provided: {}",
                parent_tier.id_column(),
                batch.parent_id()
            )));
        }

        let child_tier = transition.child();
        let child_ids = batch.child_ids();
        let matched = self.catalog.entities_in_term(child_tier, &child_ids, term).await?;
        if matched.len() != child_ids.len() {
            let missing: Vec<String> = child_ids
                .iter()
                .filter(|id| !matched.contains(id))
                .map(ToString::to_string)
                .collect();
            return Err(DomainError::NotFound(format!(
                "Some provided {}s are invalid or do not match subject={} quarter={}: [{}]",
                child_tier.id_column(),
                term.subject,
                term.quarter,
                missing.join(", ")
            )));
        }

        let students = self.catalog.cohort_student_ids(cohort).await?;
        if students.is_empty() {
            return Err(DomainError::NotFound(format!(
                "No students found in students_records for {cohort}"
            )));
        }

        Ok(students)
    }
}
