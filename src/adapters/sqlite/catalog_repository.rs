//! SQLite implementation of the CatalogRepository.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::MAX_BIND_CHUNK;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AcademicScope, AssessmentCriterion, Cohort, EntityId, LearningOutcome, ReportOutcome, Student,
    StudentId, TermScope, Tier,
};
use crate::domain::ports::CatalogRepository;

#[derive(Clone)]
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn find_criterion(
        &self,
        id: EntityId,
        scope: &AcademicScope,
    ) -> DomainResult<Option<AssessmentCriterion>> {
        let criterion = sqlx::query_as::<_, AssessmentCriterion>(
            "SELECT id, name, max_marks, subject, year, quarter FROM assessment_criterias
             WHERE id = ? AND subject = ? AND year = ? AND quarter = ?",
        )
        .bind(id)
        .bind(&scope.subject)
        .bind(scope.year)
        .bind(&scope.quarter)
        .fetch_optional(&self.pool)
        .await?;

        Ok(criterion)
    }

    async fn entity_exists(&self, tier: Tier, id: EntityId) -> DomainResult<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as(&format!("SELECT 1 FROM {} WHERE id = ?", tier.entity_table()))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn entities_in_term(
        &self,
        tier: Tier,
        ids: &[EntityId],
        term: &TermScope,
    ) -> DomainResult<Vec<EntityId>> {
        let mut found = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(MAX_BIND_CHUNK) {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new(format!("SELECT id FROM {} WHERE ", tier.entity_table()));
            if tier.is_scoped() {
                qb.push("subject = ")
                    .push_bind(&term.subject)
                    .push(" AND quarter = ")
                    .push_bind(&term.quarter)
                    .push(" AND ");
            }
            qb.push("id IN (");
            let mut separated = qb.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");

            let rows: Vec<(EntityId,)> = qb.build_query_as().fetch_all(&self.pool).await?;
            found.extend(rows.into_iter().map(|(id,)| id));
        }

        Ok(found)
    }

    async fn student_exists(&self, id: StudentId) -> DomainResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn cohort_student_ids(&self, cohort: &Cohort) -> DomainResult<Vec<StudentId>> {
        let rows: Vec<(StudentId,)> = sqlx::query_as(
            "SELECT DISTINCT student_id FROM students_records
             WHERE year = ? AND class = ? AND section = ?
             ORDER BY student_id",
        )
        .bind(cohort.year)
        .bind(cohort.class)
        .bind(&cohort.section)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn create_student(&self, name: &str, cohort: &Cohort) -> DomainResult<Student> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO students (name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        sqlx::query(
            "INSERT INTO students_records (student_id, year, class, section) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(cohort.year)
        .bind(cohort.class)
        .bind(&cohort.section)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Student {
            id: StudentId(id),
            name: name.to_string(),
        })
    }

    async fn list_students(&self, cohort: &Cohort) -> DomainResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT DISTINCT s.id, s.name FROM students s
             JOIN students_records r ON s.id = r.student_id
             WHERE r.year = ? AND r.class = ? AND r.section = ?
             ORDER BY s.id",
        )
        .bind(cohort.year)
        .bind(cohort.class)
        .bind(&cohort.section)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn create_criterion(
        &self,
        name: &str,
        max_marks: f64,
        scope: &AcademicScope,
    ) -> DomainResult<AssessmentCriterion> {
        let id = sqlx::query(
            "INSERT INTO assessment_criterias (name, max_marks, subject, year, quarter)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(max_marks)
        .bind(&scope.subject)
        .bind(scope.year)
        .bind(&scope.quarter)
        .execute(&self.pool)
        .await
        .map_err(|e| match DomainError::from(e) {
            DomainError::Conflict(_) => DomainError::Conflict(format!(
                "Assessment criterion '{name}' already exists for {} {} {}",
                scope.subject, scope.year, scope.quarter
            )),
            other => other,
        })?
        .last_insert_rowid();

        Ok(AssessmentCriterion {
            id: EntityId(id),
            name: name.to_string(),
            max_marks,
            subject: scope.subject.clone(),
            year: scope.year,
            quarter: scope.quarter.clone(),
        })
    }

    async fn list_criteria(&self, scope: &AcademicScope) -> DomainResult<Vec<AssessmentCriterion>> {
        let criteria = sqlx::query_as::<_, AssessmentCriterion>(
            "SELECT id, name, max_marks, subject, year, quarter FROM assessment_criterias
             WHERE subject = ? AND year = ? AND quarter = ?
             ORDER BY id",
        )
        .bind(&scope.subject)
        .bind(scope.year)
        .bind(&scope.quarter)
        .fetch_all(&self.pool)
        .await?;

        Ok(criteria)
    }

    async fn create_learning_outcome(
        &self,
        name: &str,
        scope: &AcademicScope,
    ) -> DomainResult<LearningOutcome> {
        let id = sqlx::query(
            "INSERT INTO learning_outcomes (name, subject, year, quarter) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(&scope.subject)
        .bind(scope.year)
        .bind(&scope.quarter)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(LearningOutcome {
            id: EntityId(id),
            name: name.to_string(),
            subject: scope.subject.clone(),
            year: scope.year,
            quarter: scope.quarter.clone(),
        })
    }

    async fn list_learning_outcomes(
        &self,
        scope: &AcademicScope,
    ) -> DomainResult<Vec<LearningOutcome>> {
        let outcomes = sqlx::query_as::<_, LearningOutcome>(
            "SELECT id, name, subject, year, quarter FROM learning_outcomes
             WHERE subject = ? AND year = ? AND quarter = ?
             ORDER BY id",
        )
        .bind(&scope.subject)
        .bind(scope.year)
        .bind(&scope.quarter)
        .fetch_all(&self.pool)
        .await?;

        Ok(outcomes)
    }

    async fn create_report_outcome(&self, name: &str) -> DomainResult<ReportOutcome> {
        let id = sqlx::query("INSERT INTO report_outcomes (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(ReportOutcome {
            id: EntityId(id),
            name: name.to_string(),
        })
    }

    async fn list_report_outcomes(&self) -> DomainResult<Vec<ReportOutcome>> {
        let outcomes = sqlx::query_as::<_, ReportOutcome>(
            "SELECT id, name FROM report_outcomes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(outcomes)
    }
}
