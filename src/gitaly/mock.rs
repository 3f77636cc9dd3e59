//! Mock Gitaly client for testing
//!
//! Repositories are keyed by project id. Files are keyed by
//! (project id, revision, path); anything not registered reads as "not a blob".

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Blob, RemoteBranch, RepositoryService};
use crate::error::{ProtocolError, Result};
use crate::models::{RepositoryCoordinate, normalize_branch_name};

/// Scripted failure for one project
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// FindAllBranches fails with this status code
    Status(tonic::Code),
    /// TreeEntry returns no messages at all
    EmptyTreeEntry,
}

/// Mock repository service.
///
/// # Example
/// ```ignore
/// let gitaly = MockRepositoryService::new()
///     .with_branches(7, &[("refs/heads/main", "abc")])
///     .await
///     .with_file(7, "abc", ".gitlab-ci.yml", "build:\n  script: make\n")
///     .await;
/// ```
#[derive(Default)]
pub struct MockRepositoryService {
    branches: Arc<Mutex<HashMap<i64, Vec<(String, String)>>>>,
    files: Arc<Mutex<HashMap<(i64, String, String), Vec<u8>>>>,
    failures: Arc<Mutex<HashMap<i64, MockFailure>>>,
    call_count: Arc<Mutex<CallCounts>>,
    captured_fetches: Arc<Mutex<Vec<(i64, String)>>>,
}

/// Tracks RPC counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_branches: usize,
    pub fetch_blob: usize,
}

impl MockRepositoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the wire-level branch listing (names may carry `refs/heads/`).
    pub async fn with_branches(self, project_id: i64, branches: &[(&str, &str)]) -> Self {
        self.branches.lock().await.insert(
            project_id,
            branches
                .iter()
                .map(|(name, commit)| (name.to_string(), commit.to_string()))
                .collect(),
        );
        self
    }

    pub async fn with_file(self, project_id: i64, revision: &str, path: &str, data: &str) -> Self {
        self.files.lock().await.insert(
            (project_id, revision.to_string(), path.to_string()),
            data.as_bytes().to_vec(),
        );
        self
    }

    pub async fn with_failure(self, project_id: i64, failure: MockFailure) -> Self {
        self.failures.lock().await.insert(project_id, failure);
        self
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// (project id, revision) of every fetch_blob call, in call order
    pub async fn captured_fetches(&self) -> Vec<(i64, String)> {
        self.captured_fetches.lock().await.clone()
    }
}

#[async_trait]
impl RepositoryService for MockRepositoryService {
    async fn list_branches(
        &self,
        coordinate: &RepositoryCoordinate,
        full_path: &str,
    ) -> Result<Vec<RemoteBranch>> {
        self.call_count.lock().await.list_branches += 1;

        if let Some(MockFailure::Status(code)) = self.failures.lock().await.get(&coordinate.project_id)
        {
            return Err(ProtocolError::Rpc {
                rpc: "FindAllBranches",
                path: full_path.to_string(),
                code: *code,
                message: "mock failure".to_string(),
            }
            .into());
        }

        let branches = self.branches.lock().await;
        let listed: Vec<RemoteBranch> = branches
            .get(&coordinate.project_id)
            .map(|list| {
                list.iter()
                    .map(|(name, commit)| RemoteBranch {
                        name: normalize_branch_name(name).to_string(),
                        commit: commit.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if listed.is_empty() {
            return Err(ProtocolError::NoBranches(full_path.to_string()).into());
        }
        Ok(listed)
    }

    async fn fetch_blob(
        &self,
        coordinate: &RepositoryCoordinate,
        revision: &str,
        path: &str,
    ) -> Result<Option<Blob>> {
        self.call_count.lock().await.fetch_blob += 1;
        self.captured_fetches
            .lock()
            .await
            .push((coordinate.project_id, revision.to_string()));

        if let Some(MockFailure::EmptyTreeEntry) =
            self.failures.lock().await.get(&coordinate.project_id)
        {
            return Err(ProtocolError::EmptyResponse {
                rpc: "TreeEntry",
                path: path.to_string(),
            }
            .into());
        }

        let files = self.files.lock().await;
        Ok(files
            .get(&(coordinate.project_id, revision.to_string(), path.to_string()))
            .map(|data| Blob {
                oid: format!("oid-{}", revision),
                size: data.len() as i64,
                data: data.clone(),
            }))
    }
}
