//! Implementation of the `attainment migrate` command.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::adapters::sqlite::{initialize_database, Migrator, PoolConfig};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct MigrateOutput {
    pub database: String,
    pub schema_version: i64,
}

impl CommandOutput for MigrateOutput {
    fn to_human(&self) -> String {
        format!(
            "Database {} is at schema version {}",
            self.database, self.schema_version
        )
    }
}

pub async fn execute(config: Config, json_mode: bool) -> Result<()> {
    let url = config.database.url();
    let pool = initialize_database(&url, Some(PoolConfig::from(&config.database)))
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database.path))?;

    let schema_version = Migrator::new(pool.clone())
        .get_current_version()
        .await
        .context("Failed to read schema version")?;
    pool.close().await;

    output(
        &MigrateOutput {
            database: config.database.path,
            schema_version,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_migrate_creates_database() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("scores.db");
        let mut config = Config::default();
        config.database.path = db_path.display().to_string();

        execute(config, true).await.unwrap();
        assert!(db_path.exists());
    }
}
