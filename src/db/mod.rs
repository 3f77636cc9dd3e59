//! GitLab database access
//!
//! The catalog only needs four read-only lookups against the GitLab schema.
//! They live behind [`HostingDatabase`] so the pipeline can run against an
//! in-memory mock in tests.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod postgres;
pub mod queries;

#[cfg(test)]
pub use mock::MockHostingDatabase;
pub use postgres::PgHostingDatabase;

/// GitLab database operations used by the resolver and the catalog
#[async_trait]
pub trait HostingDatabase: Send + Sync {
    /// Projects holding at least one retained job artifact
    async fn projects_with_artifacts(&self) -> Result<Vec<ArtifactProject>>;

    /// Distinct (project, ref) pairs holding at least one retained artifact
    async fn branches_with_artifacts(&self) -> Result<Vec<ArtifactBranch>>;

    /// Namespace id for `path` directly under `parent_id` (`None` = root)
    async fn get_namespace(&self, path: &str, parent_id: Option<i64>) -> Result<Option<i64>>;

    /// Project named `path` inside namespace `parent_id`
    async fn get_project(&self, path: &str, parent_id: Option<i64>)
    -> Result<Option<ProjectRecord>>;
}

/// Row of the projects-with-artifacts inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ArtifactProject {
    pub project_id: i64,
    pub project_path: String,
    pub namespace_path: String,
    pub artifact_count: i64,
    pub artifact_size: i64,
}

impl ArtifactProject {
    /// Namespace-qualified project path
    pub fn full_path(&self) -> String {
        if self.namespace_path.is_empty() {
            self.project_path.clone()
        } else {
            format!("{}/{}", self.namespace_path, self.project_path)
        }
    }
}

/// A branch with retained artifacts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, sqlx::FromRow)]
pub struct ArtifactBranch {
    pub project_id: i64,
    pub branch_ref: String,
}

/// Project row as needed to build a repository coordinate
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProjectRecord {
    pub project_id: i64,
    pub storage_name: String,
    pub disk_path: Option<String>,
}
