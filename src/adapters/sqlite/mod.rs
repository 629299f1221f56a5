//! SQLite database adapters for the attainment service.

pub mod catalog_repository;
pub mod connection;
pub mod mapping_repository;
pub mod migrations;
pub mod score_repository;

pub use catalog_repository::SqliteCatalogRepository;
pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use mapping_repository::SqliteMappingRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use score_repository::SqliteScoreRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};

/// Upper bound on ids bound into a single `IN (...)` list.
pub(crate) const MAX_BIND_CHUNK: usize = 500;

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::StorageFault(format!("corrupt timestamp '{s}': {e}")))
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// Open a pool on `database_url` and bring its schema up to date.
pub async fn initialize_database(
    database_url: &str,
    config: Option<PoolConfig>,
) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    verify_connection(&pool).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
