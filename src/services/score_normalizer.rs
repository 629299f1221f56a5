use std::sync::Arc;

use chrono::Utc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{MarkSubmission, ScoreRecord, Tier};
use crate::domain::ports::{CatalogRepository, ScoreRepository};

/// Unit-interval score for `obtained` out of `max`.
///
/// `max` must be positive; `obtained` must lie in `[0, max]`.
pub fn normalize(obtained: f64, max: f64) -> DomainResult<f64> {
    check_obtained(obtained)?;
    if obtained > max {
        return Err(DomainError::InvalidInput(
            "Obtained Marks cannot be greater than Maximum marks of the Assessment".to_string(),
        ));
    }
    Ok(obtained / max)
}

fn check_obtained(obtained: f64) -> DomainResult<()> {
    if obtained.is_finite() && obtained >= 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!(
            "obtained_marks must be a non-negative number, got {obtained}"
        )))
    }
}

/// Records raw criterion marks as normalized scores.
pub struct ScoreNormalizer {
    catalog: Arc<dyn CatalogRepository>,
    scores: Arc<dyn ScoreRepository>,
}

impl ScoreNormalizer {
    pub fn new(catalog: Arc<dyn CatalogRepository>, scores: Arc<dyn ScoreRepository>) -> Self {
        Self { catalog, scores }
    }

    /// Normalize and upsert one mark. A later call for the same
    /// (student, criterion) overwrites the earlier value.
    #[tracing::instrument(skip(self, submission), fields(
        student_id = %submission.student_id,
        ac_id = %submission.criterion_id,
    ))]
    pub async fn record(&self, submission: MarkSubmission) -> DomainResult<ScoreRecord> {
        check_obtained(submission.obtained_marks)?;

        let criterion = self
            .catalog
            .find_criterion(submission.criterion_id, &submission.scope)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!(
                    "Assessment criteria {} not found for subject={} year={} quarter={}",
                    submission.criterion_id,
                    submission.scope.subject,
                    submission.scope.year,
                    submission.scope.quarter
                ))
            })?;

        if !self.catalog.student_exists(submission.student_id).await? {
            return Err(DomainError::NotFound(format!(
                "Student {} not found",
                submission.student_id
            )));
        }

        let value = normalize(submission.obtained_marks, criterion.max_marks)?;
        let updated_at = Utc::now();
        self.scores
            .upsert(Tier::Criterion, submission.student_id, criterion.id, value, updated_at)
            .await?;

        tracing::debug!(value, max_marks = criterion.max_marks, "criterion score recorded");

        Ok(ScoreRecord {
            student_id: submission.student_id,
            entity_id: criterion.id,
            value,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteCatalogRepository, SqliteScoreRepository,
    };
    use crate::domain::models::{AcademicScope, Cohort, EntityId, StudentId};

    struct Fixture {
        normalizer: ScoreNormalizer,
        scores: Arc<SqliteScoreRepository>,
        student: StudentId,
        ac: EntityId,
    }

    fn scope() -> AcademicScope {
        AcademicScope::new("math", 2024, "Q1")
    }

    async fn setup() -> Fixture {
        let pool = create_migrated_test_pool().await.unwrap();
        let catalog = Arc::new(SqliteCatalogRepository::new(pool.clone()));
        let scores = Arc::new(SqliteScoreRepository::new(pool));
        let student = catalog.create_student("Ana", &Cohort::new(2024, 5, "A")).await.unwrap().id;
        let ac = catalog.create_criterion("Quiz", 50.0, &scope()).await.unwrap().id;

        Fixture {
            normalizer: ScoreNormalizer::new(catalog, scores.clone()),
            scores,
            student,
            ac,
        }
    }

    fn submission(f: &Fixture, obtained: f64) -> MarkSubmission {
        MarkSubmission {
            student_id: f.student,
            criterion_id: f.ac,
            obtained_marks: obtained,
            scope: scope(),
        }
    }

    #[test]
    fn test_normalize_bounds() {
        assert!((normalize(40.0, 50.0).unwrap() - 0.8).abs() < 1e-12);
        assert!((normalize(0.0, 50.0).unwrap()).abs() < f64::EPSILON);
        assert!((normalize(50.0, 50.0).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(normalize(50.5, 50.0).is_err());
        assert!(normalize(-1.0, 50.0).is_err());
        assert!(normalize(f64::NAN, 50.0).is_err());
    }

    #[tokio::test]
    async fn test_record_forty_of_fifty() {
        let f = setup().await;
        let record = f.normalizer.record(submission(&f, 40.0)).await.unwrap();
        assert!((record.value - 0.8).abs() < 1e-12);

        let stored = f.scores.for_student(Tier::Criterion, f.student, Some(f.ac)).await.unwrap();
        assert!((stored[0].value - 0.8).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_record_overwrites() {
        let f = setup().await;
        f.normalizer.record(submission(&f, 40.0)).await.unwrap();
        f.normalizer.record(submission(&f, 10.0)).await.unwrap();

        let stored = f.scores.for_student(Tier::Criterion, f.student, None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!((stored[0].value - 0.2).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_record_zero_marks_is_valid() {
        let f = setup().await;
        let record = f.normalizer.record(submission(&f, 0.0)).await.unwrap();
        assert!(record.value.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_record_above_max_is_invalid_and_writes_nothing() {
        let f = setup().await;
        let err = f.normalizer.record(submission(&f, 51.0)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(f.scores.for_student(Tier::Criterion, f.student, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_scope_mismatch_is_not_found() {
        let f = setup().await;
        let mut s = submission(&f, 10.0);
        s.scope.year = 2023;
        let err = f.normalizer.record(s).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_record_unknown_student_is_not_found() {
        let f = setup().await;
        let mut s = submission(&f, 10.0);
        s.student_id = StudentId(999);
        let err = f.normalizer.record(s).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(msg) if msg.contains("Student")));
    }
}
