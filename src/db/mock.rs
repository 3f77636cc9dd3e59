//! In-memory GitLab database for testing
//!
//! Namespaces and projects are registered by full path; the mock builds the
//! parent chain the same way the real schema stores it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{ArtifactBranch, ArtifactProject, HostingDatabase, ProjectRecord};
use crate::error::Result;

type Key = (Option<i64>, String);

/// Mock database for testing.
///
/// # Example
/// ```ignore
/// let db = MockHostingDatabase::new()
///     .with_project("group/app", 7, "default", None)
///     .await;
/// ```
#[derive(Default)]
pub struct MockHostingDatabase {
    namespaces: Arc<Mutex<HashMap<Key, i64>>>,
    projects: Arc<Mutex<HashMap<Key, ProjectRecord>>>,
    inventory: Arc<Mutex<Vec<ArtifactProject>>>,
    branches: Arc<Mutex<Vec<ArtifactBranch>>>,
    /// Make the inventory queries fail like an unreachable database
    fail_inventory: Arc<Mutex<bool>>,
    call_count: Arc<Mutex<CallCounts>>,
}

/// Tracks query counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub projects_with_artifacts: usize,
    pub branches_with_artifacts: usize,
    pub get_namespace: usize,
    pub get_project: usize,
}

impl MockHostingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project by full path, creating missing namespaces.
    pub async fn with_project(
        self,
        full_path: &str,
        project_id: i64,
        storage_name: &str,
        disk_path: Option<&str>,
    ) -> Self {
        let mut segments: Vec<&str> = full_path.split('/').collect();
        let name = segments.pop().unwrap_or_default();

        let mut parent = None;
        {
            let mut namespaces = self.namespaces.lock().await;
            for segment in segments {
                let next_id = 1000 + namespaces.len() as i64;
                let id = *namespaces
                    .entry((parent, segment.to_string()))
                    .or_insert(next_id);
                parent = Some(id);
            }
        }

        self.projects.lock().await.insert(
            (parent, name.to_string()),
            ProjectRecord {
                project_id,
                storage_name: storage_name.to_string(),
                disk_path: disk_path.map(str::to_string),
            },
        );
        self
    }

    /// Register a namespace without projects.
    pub async fn with_namespace(self, path: &str, parent_id: Option<i64>, id: i64) -> Self {
        self.namespaces
            .lock()
            .await
            .insert((parent_id, path.to_string()), id);
        self
    }

    /// Add a row to the projects-with-artifacts inventory.
    pub async fn with_inventory(self, full_path: &str, project_id: i64) -> Self {
        let (namespace_path, project_path) = match full_path.rsplit_once('/') {
            Some((ns, name)) => (ns.to_string(), name.to_string()),
            None => (String::new(), full_path.to_string()),
        };
        self.inventory.lock().await.push(ArtifactProject {
            project_id,
            project_path,
            namespace_path,
            artifact_count: 1,
            artifact_size: 1024,
        });
        self
    }

    /// Mark a branch as holding artifacts.
    pub async fn with_artifact_branch(self, project_id: i64, branch_ref: &str) -> Self {
        self.branches.lock().await.push(ArtifactBranch {
            project_id,
            branch_ref: branch_ref.to_string(),
        });
        self
    }

    pub async fn failing_inventory(self) -> Self {
        *self.fail_inventory.lock().await = true;
        self
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }
}

#[async_trait]
impl HostingDatabase for MockHostingDatabase {
    async fn projects_with_artifacts(&self) -> Result<Vec<ArtifactProject>> {
        self.call_count.lock().await.projects_with_artifacts += 1;
        if *self.fail_inventory.lock().await {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(self.inventory.lock().await.clone())
    }

    async fn branches_with_artifacts(&self) -> Result<Vec<ArtifactBranch>> {
        self.call_count.lock().await.branches_with_artifacts += 1;
        if *self.fail_inventory.lock().await {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(self.branches.lock().await.clone())
    }

    async fn get_namespace(&self, path: &str, parent_id: Option<i64>) -> Result<Option<i64>> {
        self.call_count.lock().await.get_namespace += 1;
        let namespaces = self.namespaces.lock().await;
        Ok(namespaces.get(&(parent_id, path.to_string())).copied())
    }

    async fn get_project(
        &self,
        path: &str,
        parent_id: Option<i64>,
    ) -> Result<Option<ProjectRecord>> {
        self.call_count.lock().await.get_project += 1;
        let projects = self.projects.lock().await;
        Ok(projects.get(&(parent_id, path.to_string())).cloned())
    }
}
