//! SQLite implementation of the MappingRepository.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{parse_datetime, MAX_BIND_CHUNK};
use super::score_repository::upsert_sql;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    EntityId, MappingMode, MappingRecord, PropagationCommit, TierTransition,
};
use crate::domain::ports::MappingRepository;

#[derive(Clone)]
pub struct SqliteMappingRepository {
    pool: SqlitePool,
}

impl SqliteMappingRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn mapping_upsert_sql(transition: TierTransition) -> String {
    format!(
        "INSERT INTO {table} ({parent}, {child}, weight, updated_at) VALUES (?, ?, ?, ?)
         ON CONFLICT ({parent}, {child}) DO UPDATE SET weight = excluded.weight, updated_at = excluded.updated_at",
        table = transition.mapping_table(),
        parent = transition.parent().id_column(),
        child = transition.child().id_column(),
    )
}

#[async_trait]
impl MappingRepository for SqliteMappingRepository {
    async fn commit(&self, commit: &PropagationCommit) -> DomainResult<()> {
        let transition = commit.transition;
        let stamp = commit.computed_at.to_rfc3339();
        let mut tx = self.pool.begin().await?;

        if commit.mode == MappingMode::Replace {
            let kept: HashSet<EntityId> = commit.weights.iter().map(|w| w.child_id).collect();
            let stored: Vec<EntityId> = sqlx::query_scalar(&format!(
                "SELECT {child} FROM {table} WHERE {parent} = ?",
                table = transition.mapping_table(),
                parent = transition.parent().id_column(),
                child = transition.child().id_column(),
            ))
            .bind(commit.parent_id)
            .fetch_all(&mut *tx)
            .await?;
            let omitted: Vec<EntityId> = stored.into_iter().filter(|id| !kept.contains(id)).collect();

            for chunk in omitted.chunks(MAX_BIND_CHUNK) {
                let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
                    "DELETE FROM {} WHERE {} = ",
                    transition.mapping_table(),
                    transition.parent().id_column()
                ));
                qb.push_bind(commit.parent_id);
                qb.push(format!(" AND {} IN (", transition.child().id_column()));
                let mut separated = qb.separated(", ");
                for id in chunk {
                    separated.push_bind(*id);
                }
                separated.push_unseparated(")");
                qb.build().execute(&mut *tx).await?;
            }
            if !omitted.is_empty() {
                tracing::debug!(
                    transition = %transition,
                    parent_id = %commit.parent_id,
                    removed = omitted.len(),
                    "dropped mappings omitted from the new batch"
                );
            }
        }

        let mapping_sql = mapping_upsert_sql(transition);
        for w in &commit.weights {
            sqlx::query(&mapping_sql)
                .bind(commit.parent_id)
                .bind(w.child_id)
                .bind(w.weight)
                .bind(&stamp)
                .execute(&mut *tx)
                .await?;
        }

        let score_sql = upsert_sql(commit.parent_tier());
        for score in &commit.scores {
            sqlx::query(&score_sql)
                .bind(score.student_id)
                .bind(commit.parent_id)
                .bind(score.value)
                .bind(&stamp)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn for_parent(
        &self,
        transition: TierTransition,
        parent_id: EntityId,
    ) -> DomainResult<Vec<MappingRecord>> {
        let rows: Vec<MappingRow> = sqlx::query_as(&format!(
            "SELECT {parent} AS parent_id, {child} AS child_id, weight, updated_at FROM {table}
             WHERE {parent} = ? ORDER BY {child}",
            table = transition.mapping_table(),
            parent = transition.parent().id_column(),
            child = transition.child().id_column(),
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct MappingRow {
    parent_id: EntityId,
    child_id: EntityId,
    weight: f64,
    updated_at: String,
}

impl TryFrom<MappingRow> for MappingRecord {
    type Error = DomainError;

    fn try_from(row: MappingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            parent_id: row.parent_id,
            child_id: row.child_id,
            weight: row.weight,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteCatalogRepository, SqliteScoreRepository,
    };
    use crate::domain::models::{
        AcademicScope, Cohort, ParentScore, ResolvedWeight, StudentId, Tier,
    };
    use crate::domain::ports::{CatalogRepository, ScoreRepository};
    use chrono::Utc;

    struct Fixture {
        mappings: SqliteMappingRepository,
        scores: SqliteScoreRepository,
        lo: EntityId,
        acs: Vec<EntityId>,
        student: StudentId,
    }

    async fn setup() -> Fixture {
        let pool = create_migrated_test_pool().await.unwrap();
        let catalog = SqliteCatalogRepository::new(pool.clone());
        let scope = AcademicScope::new("math", 2024, "Q1");
        let lo = catalog.create_learning_outcome("Fractions", &scope).await.unwrap().id;
        let mut acs = Vec::new();
        for name in ["A", "B", "C"] {
            acs.push(catalog.create_criterion(name, 10.0, &scope).await.unwrap().id);
        }
        let student = catalog.create_student("Ana", &Cohort::new(2024, 5, "A")).await.unwrap().id;

        Fixture {
            mappings: SqliteMappingRepository::new(pool.clone()),
            scores: SqliteScoreRepository::new(pool),
            lo,
            acs,
            student,
        }
    }

    fn commit(f: &Fixture, mode: MappingMode, children: &[(EntityId, f64)], score: f64) -> PropagationCommit {
        PropagationCommit {
            transition: TierTransition::CriteriaToLearningOutcome,
            parent_id: f.lo,
            mode,
            weights: children
                .iter()
                .map(|&(child_id, weight)| ResolvedWeight { child_id, weight })
                .collect(),
            scores: vec![ParentScore {
                student_id: f.student,
                value: score,
            }],
            computed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_writes_mappings_and_scores() {
        let f = setup().await;
        let c = commit(&f, MappingMode::Replace, &[(f.acs[0], 0.6), (f.acs[1], 0.4)], 0.75);
        f.mappings.commit(&c).await.unwrap();

        let rows = f.mappings.for_parent(TierTransition::CriteriaToLearningOutcome, f.lo).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].child_id, f.acs[0]);
        assert!((rows[0].weight - 0.6).abs() < 1e-12);

        let scores = f.scores.for_student(Tier::LearningOutcome, f.student, Some(f.lo)).await.unwrap();
        assert!((scores[0].value - 0.75).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_replace_drops_omitted_children() {
        let f = setup().await;
        f.mappings
            .commit(&commit(&f, MappingMode::Replace, &[(f.acs[0], 0.5), (f.acs[1], 0.5)], 0.5))
            .await
            .unwrap();
        f.mappings
            .commit(&commit(&f, MappingMode::Replace, &[(f.acs[2], 1.0)], 0.2))
            .await
            .unwrap();

        let rows = f.mappings.for_parent(TierTransition::CriteriaToLearningOutcome, f.lo).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].child_id, f.acs[2]);
    }

    #[tokio::test]
    async fn test_replace_handles_more_children_than_one_bind_list() {
        let pool = create_migrated_test_pool().await.unwrap();
        let catalog = SqliteCatalogRepository::new(pool.clone());
        let mappings = SqliteMappingRepository::new(pool);
        let scope = AcademicScope::new("math", 2024, "Q1");
        let lo = catalog.create_learning_outcome("Fractions", &scope).await.unwrap().id;

        let mut acs = Vec::new();
        for i in 0..MAX_BIND_CHUNK + 20 {
            acs.push(catalog.create_criterion(&format!("AC {i}"), 10.0, &scope).await.unwrap().id);
        }
        let even = 1.0 / acs.len() as f64;
        let wide = PropagationCommit {
            transition: TierTransition::CriteriaToLearningOutcome,
            parent_id: lo,
            mode: MappingMode::Replace,
            weights: acs.iter().map(|&child_id| ResolvedWeight { child_id, weight: even }).collect(),
            scores: Vec::new(),
            computed_at: Utc::now(),
        };
        mappings.commit(&wide).await.unwrap();

        let narrow = PropagationCommit {
            weights: vec![ResolvedWeight { child_id: acs[3], weight: 1.0 }],
            computed_at: Utc::now(),
            ..wide
        };
        mappings.commit(&narrow).await.unwrap();

        let rows = mappings.for_parent(TierTransition::CriteriaToLearningOutcome, lo).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].child_id, acs[3]);
    }

    #[tokio::test]
    async fn test_merge_keeps_omitted_children() {
        let f = setup().await;
        f.mappings
            .commit(&commit(&f, MappingMode::Merge, &[(f.acs[0], 0.5), (f.acs[1], 0.5)], 0.5))
            .await
            .unwrap();
        f.mappings
            .commit(&commit(&f, MappingMode::Merge, &[(f.acs[1], 1.0)], 0.2))
            .await
            .unwrap();

        let rows = f.mappings.for_parent(TierTransition::CriteriaToLearningOutcome, f.lo).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!((rows[0].weight - 0.5).abs() < 1e-12);
        assert!((rows[1].weight - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_prior_state() {
        let f = setup().await;
        f.mappings
            .commit(&commit(&f, MappingMode::Replace, &[(f.acs[0], 1.0)], 0.4))
            .await
            .unwrap();

        // Second child id does not exist: the foreign key fails mid-transaction.
        let bad = commit(&f, MappingMode::Replace, &[(f.acs[1], 0.5), (EntityId(9999), 0.5)], 0.9);
        let err = f.mappings.commit(&bad).await.unwrap_err();
        assert!(matches!(err, DomainError::StorageFault(_)));

        let rows = f.mappings.for_parent(TierTransition::CriteriaToLearningOutcome, f.lo).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].child_id, f.acs[0]);

        let scores = f.scores.for_student(Tier::LearningOutcome, f.student, Some(f.lo)).await.unwrap();
        assert!((scores[0].value - 0.4).abs() < 1e-12);
    }
}
