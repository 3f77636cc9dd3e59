//! Gitaly repository client
//!
//! The catalog needs two things from Gitaly: the branch list of a repository
//! and the content of a single file at a revision. [`RepositoryService`] is the
//! seam; [`GitalySession`] implements it over gRPC and a mock implements it for
//! tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RepositoryCoordinate;

pub mod client;
#[cfg(test)]
pub mod mock;
pub mod proto;

pub use client::GitalySession;
#[cfg(test)]
pub use mock::MockRepositoryService;

/// Branch as reported by the server, name already normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBranch {
    pub name: String,
    pub commit: String,
}

/// File content at a revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub oid: String,
    pub size: i64,
    pub data: Vec<u8>,
}

/// Remote repository operations
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// All branches of the repository, in server order.
    ///
    /// An empty listing is an error: every real repository has a branch, so
    /// none usually means the coordinate points at the wrong place.
    async fn list_branches(
        &self,
        coordinate: &RepositoryCoordinate,
        full_path: &str,
    ) -> Result<Vec<RemoteBranch>>;

    /// The blob at `path` as of `revision`, or `None` when the path is not a
    /// regular file at that revision.
    async fn fetch_blob(
        &self,
        coordinate: &RepositoryCoordinate,
        revision: &str,
        path: &str,
    ) -> Result<Option<Blob>>;
}
