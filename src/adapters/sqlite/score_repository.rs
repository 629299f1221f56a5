//! SQLite implementation of the ScoreRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{parse_datetime, MAX_BIND_CHUNK};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EntityId, ScoreRecord, StudentId, Tier};
use crate::domain::ports::ScoreRepository;

#[derive(Clone)]
pub struct SqliteScoreRepository {
    pool: SqlitePool,
}

impl SqliteScoreRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// `INSERT ... ON CONFLICT DO UPDATE` for a tier's score table.
pub(crate) fn upsert_sql(tier: Tier) -> String {
    format!(
        "INSERT INTO {table} (student_id, {col}, value, updated_at) VALUES (?, ?, ?, ?)
         ON CONFLICT (student_id, {col}) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        table = tier.score_table(),
        col = tier.id_column(),
    )
}

fn select_prefix(tier: Tier) -> String {
    format!(
        "SELECT student_id, {col} AS entity_id, value, updated_at FROM {table} WHERE ",
        table = tier.score_table(),
        col = tier.id_column(),
    )
}

#[async_trait]
impl ScoreRepository for SqliteScoreRepository {
    async fn upsert(
        &self,
        tier: Tier,
        student_id: StudentId,
        entity_id: EntityId,
        value: f64,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        sqlx::query(&upsert_sql(tier))
            .bind(student_id)
            .bind(entity_id)
            .bind(value)
            .bind(updated_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn for_student(
        &self,
        tier: Tier,
        student_id: StudentId,
        entity_id: Option<EntityId>,
    ) -> DomainResult<Vec<ScoreRecord>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(select_prefix(tier));
        qb.push("student_id = ").push_bind(student_id);
        if let Some(entity_id) = entity_id {
            qb.push(format!(" AND {} = ", tier.id_column())).push_bind(entity_id);
        }
        qb.push(" ORDER BY entity_id");

        let rows: Vec<ScoreRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn for_cohort(
        &self,
        tier: Tier,
        students: &[StudentId],
        entities: &[EntityId],
    ) -> DomainResult<Vec<ScoreRecord>> {
        if students.is_empty() || entities.is_empty() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for student_chunk in students.chunks(MAX_BIND_CHUNK) {
            for entity_chunk in entities.chunks(MAX_BIND_CHUNK) {
                let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(select_prefix(tier));
                qb.push("student_id IN (");
                let mut separated = qb.separated(", ");
                for id in student_chunk {
                    separated.push_bind(*id);
                }
                separated.push_unseparated(")");

                qb.push(format!(" AND {} IN (", tier.id_column()));
                let mut separated = qb.separated(", ");
                for id in entity_chunk {
                    separated.push_bind(*id);
                }
                separated.push_unseparated(")");

                let rows: Vec<ScoreRow> = qb.build_query_as().fetch_all(&self.pool).await?;
                for row in rows {
                    records.push(row.try_into()?);
                }
            }
        }

        Ok(records)
    }
}

#[derive(sqlx::FromRow)]
struct ScoreRow {
    student_id: StudentId,
    entity_id: EntityId,
    value: f64,
    updated_at: String,
}

impl TryFrom<ScoreRow> for ScoreRecord {
    type Error = DomainError;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: row.student_id,
            entity_id: row.entity_id,
            value: row.value,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteCatalogRepository};
    use crate::domain::models::{AcademicScope, Cohort};
    use crate::domain::ports::CatalogRepository;

    struct Fixture {
        scores: SqliteScoreRepository,
        students: Vec<StudentId>,
        criteria: Vec<EntityId>,
    }

    async fn setup() -> Fixture {
        let pool = create_migrated_test_pool().await.unwrap();
        let catalog = SqliteCatalogRepository::new(pool.clone());
        let cohort = Cohort::new(2024, 5, "A");
        let scope = AcademicScope::new("math", 2024, "Q1");

        let mut students = Vec::new();
        for name in ["Ana", "Ben", "Cy"] {
            students.push(catalog.create_student(name, &cohort).await.unwrap().id);
        }
        let mut criteria = Vec::new();
        for name in ["Quiz", "Essay"] {
            criteria.push(catalog.create_criterion(name, 10.0, &scope).await.unwrap().id);
        }

        Fixture {
            scores: SqliteScoreRepository::new(pool),
            students,
            criteria,
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let f = setup().await;
        let (s, ac) = (f.students[0], f.criteria[0]);

        f.scores.upsert(Tier::Criterion, s, ac, 0.4, Utc::now()).await.unwrap();
        f.scores.upsert(Tier::Criterion, s, ac, 0.9, Utc::now()).await.unwrap();

        let rows = f.scores.for_student(Tier::Criterion, s, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].value - 0.9).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_for_student_with_entity_filter() {
        let f = setup().await;
        let s = f.students[0];
        f.scores.upsert(Tier::Criterion, s, f.criteria[0], 0.1, Utc::now()).await.unwrap();
        f.scores.upsert(Tier::Criterion, s, f.criteria[1], 0.2, Utc::now()).await.unwrap();

        let all = f.scores.for_student(Tier::Criterion, s, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].entity_id, f.criteria[0]);

        let one = f
            .scores
            .for_student(Tier::Criterion, s, Some(f.criteria[1]))
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].entity_id, f.criteria[1]);

        let none = f.scores.for_student(Tier::Criterion, f.students[2], None).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_for_cohort_returns_only_present_pairs() {
        let f = setup().await;
        f.scores.upsert(Tier::Criterion, f.students[0], f.criteria[0], 0.5, Utc::now()).await.unwrap();
        f.scores.upsert(Tier::Criterion, f.students[1], f.criteria[1], 0.7, Utc::now()).await.unwrap();
        f.scores.upsert(Tier::Criterion, f.students[2], f.criteria[0], 0.3, Utc::now()).await.unwrap();

        let rows = f
            .scores
            .for_cohort(Tier::Criterion, &f.students[..2], &f.criteria)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.student_id != f.students[2]));
    }

    #[tokio::test]
    async fn test_for_cohort_chunks_long_entity_lists() {
        let f = setup().await;
        f.scores.upsert(Tier::Criterion, f.students[0], f.criteria[0], 0.5, Utc::now()).await.unwrap();
        f.scores.upsert(Tier::Criterion, f.students[1], f.criteria[1], 0.7, Utc::now()).await.unwrap();

        let mut entities: Vec<EntityId> = (10_000..10_000 + 2 * MAX_BIND_CHUNK as i64).map(EntityId).collect();
        entities.extend(&f.criteria);

        let rows = f
            .scores
            .for_cohort(Tier::Criterion, &f.students, &entities)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_for_cohort_with_empty_inputs() {
        let f = setup().await;
        let rows = f.scores.for_cohort(Tier::Criterion, &[], &f.criteria).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_score_out_of_range_is_rejected_by_schema() {
        let f = setup().await;
        let err = f
            .scores
            .upsert(Tier::Criterion, f.students[0], f.criteria[0], 1.5, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::StorageFault(_)));
    }
}
