//! PostgreSQL implementation of [`HostingDatabase`]

use async_trait::async_trait;
use log::debug;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{ArtifactBranch, ArtifactProject, HostingDatabase, ProjectRecord, queries};
use crate::config::DatabaseConfig;
use crate::error::{ConfigError, Result};

/// GitLab database reached through a connection pool
pub struct PgHostingDatabase {
    pool: PgPool,
}

impl PgHostingDatabase {
    /// Connect using the configured URL and pool size
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// Release pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl HostingDatabase for PgHostingDatabase {
    async fn projects_with_artifacts(&self) -> Result<Vec<ArtifactProject>> {
        let rows = sqlx::query_as::<_, ArtifactProject>(queries::PROJECTS_WITH_ARTIFACTS)
            .fetch_all(&self.pool)
            .await?;
        debug!("Inventory lists {} projects with artifacts", rows.len());
        Ok(rows)
    }

    async fn branches_with_artifacts(&self) -> Result<Vec<ArtifactBranch>> {
        let rows = sqlx::query_as::<_, ArtifactBranch>(queries::BRANCHES_WITH_ARTIFACTS)
            .fetch_all(&self.pool)
            .await?;
        debug!("Inventory lists {} branches with artifacts", rows.len());
        Ok(rows)
    }

    async fn get_namespace(&self, path: &str, parent_id: Option<i64>) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(queries::GET_NAMESPACE)
            .bind(path)
            .bind(parent_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn get_project(
        &self,
        path: &str,
        parent_id: Option<i64>,
    ) -> Result<Option<ProjectRecord>> {
        let row = sqlx::query_as::<_, ProjectRecord>(queries::GET_PROJECT)
            .bind(path)
            .bind(parent_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
