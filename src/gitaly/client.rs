//! gRPC implementation of [`RepositoryService`]

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use futures::{Stream, StreamExt};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Status};

use super::proto::{
    CommitServiceClient, FindAllBranchesRequest, FindAllBranchesResponse, OBJECT_TYPE_BLOB,
    RefServiceClient, Repository, TreeEntryRequest, TreeEntryResponse,
};
use super::{Blob, RemoteBranch, RepositoryService};
use crate::config::GitalyConfig;
use crate::error::{ConfigError, ProtocolError, Result};
use crate::models::{RepositoryCoordinate, normalize_branch_name};

const FIND_ALL_BRANCHES: &str = "FindAllBranches";
const TREE_ENTRY: &str = "TreeEntry";

/// Connections to every configured Gitaly storage, held for one run.
///
/// Channels connect lazily on first use and are released when the session is
/// closed or dropped.
pub struct GitalySession {
    channels: BTreeMap<String, Channel>,
    token: Option<MetadataValue<Ascii>>,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    rpc_count: AtomicUsize,
}

impl GitalySession {
    /// Open a session for the configured storages
    pub fn open(config: &GitalyConfig) -> Result<Self> {
        let mut channels = BTreeMap::new();
        for (storage, address) in &config.storages {
            let uri = address.replacen("tcp://", "http://", 1);
            let channel = Endpoint::from_shared(uri)?
                .timeout(config.timeout())
                .connect_timeout(config.connect_timeout())
                .connect_lazy();
            channels.insert(storage.clone(), channel);
        }

        let token = match config.token.as_deref() {
            Some(token) => Some(
                format!("Bearer {}", general_purpose::STANDARD.encode(token))
                    .parse::<MetadataValue<Ascii>>()
                    .map_err(|_| ConfigError::Invalid("gitaly.token is not valid".to_string()))?,
            ),
            None => None,
        };

        let per_second = NonZeroU32::new(config.requests_per_second).ok_or_else(|| {
            ConfigError::Invalid("gitaly.requests_per_second must be > 0".to_string())
        })?;

        debug!("Opened Gitaly session for {} storages", channels.len());

        Ok(Self {
            channels,
            token,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
            rpc_count: AtomicUsize::new(0),
        })
    }

    /// Release all channels and log how many RPCs the session made
    pub fn close(self) {
        debug!(
            "Closing Gitaly session after {} RPCs",
            self.rpc_count.load(Ordering::Relaxed)
        );
    }

    fn channel(&self, coordinate: &RepositoryCoordinate, path: &str) -> Result<Channel> {
        self.channels
            .get(&coordinate.storage_name)
            .cloned()
            .ok_or_else(|| {
                ProtocolError::UnknownStorage {
                    storage: coordinate.storage_name.clone(),
                    path: path.to_string(),
                }
                .into()
            })
    }

    /// Wait for the rate limiter and wrap `message` with auth metadata
    async fn request<T>(&self, message: T) -> Request<T> {
        self.rate_limiter.until_ready().await;
        self.rpc_count.fetch_add(1, Ordering::Relaxed);

        let mut request = Request::new(message);
        if let Some(ref token) = self.token {
            request
                .metadata_mut()
                .insert("authorization", token.clone());
        }
        request
    }
}

fn repository(coordinate: &RepositoryCoordinate, full_path: &str) -> Repository {
    Repository {
        storage_name: coordinate.storage_name.clone(),
        relative_path: coordinate.relative_path.clone(),
        gl_repository: coordinate.gl_repository(),
        gl_project_path: full_path.to_string(),
    }
}

/// Flatten a `FindAllBranches` page stream into normalized branches.
pub(crate) async fn collect_branches<S>(pages: S, path: &str) -> Result<Vec<RemoteBranch>>
where
    S: Stream<Item = std::result::Result<FindAllBranchesResponse, Status>>,
{
    let mut pages = pin!(pages);
    let mut branches = Vec::new();
    let mut page_count = 0usize;

    while let Some(page) = pages.next().await {
        let page = page.map_err(|s| ProtocolError::from_status(FIND_ALL_BRANCHES, path, s))?;
        page_count += 1;
        for branch in page.branches {
            let name = normalize_branch_name(&String::from_utf8_lossy(&branch.name)).to_string();
            let commit = match branch.target {
                Some(target) if !target.id.is_empty() => target.id,
                _ => {
                    return Err(ProtocolError::MissingCommit {
                        branch: name,
                        path: path.to_string(),
                    }
                    .into());
                }
            };
            branches.push(RemoteBranch { name, commit });
        }
    }

    if branches.is_empty() {
        return Err(ProtocolError::NoBranches(path.to_string()).into());
    }

    debug!(
        "{} returned {} branches in {} pages for {}",
        FIND_ALL_BRANCHES,
        branches.len(),
        page_count,
        path
    );
    Ok(branches)
}

/// Reassemble a `TreeEntry` response stream into a blob.
pub(crate) async fn collect_blob<S>(entries: S, path: &str) -> Result<Option<Blob>>
where
    S: Stream<Item = std::result::Result<TreeEntryResponse, Status>>,
{
    let mut entries = pin!(entries);

    let first = match entries.next().await {
        None => {
            return Err(ProtocolError::EmptyResponse {
                rpc: TREE_ENTRY,
                path: path.to_string(),
            }
            .into());
        }
        Some(Err(status)) if status.code() == Code::NotFound => return Ok(None),
        Some(Err(status)) => return Err(ProtocolError::from_status(TREE_ENTRY, path, status).into()),
        Some(Ok(entry)) => entry,
    };

    if first.r#type != OBJECT_TYPE_BLOB {
        debug!("{} is not a blob (type {})", path, first.r#type);
        return Ok(None);
    }

    let TreeEntryResponse {
        oid, size, mut data, ..
    } = first;
    while let Some(entry) = entries.next().await {
        let entry = entry.map_err(|s| ProtocolError::from_status(TREE_ENTRY, path, s))?;
        data.extend_from_slice(&entry.data);
    }

    let size = if size > 0 { size } else { data.len() as i64 };
    Ok(Some(Blob { oid, size, data }))
}

#[async_trait]
impl RepositoryService for GitalySession {
    async fn list_branches(
        &self,
        coordinate: &RepositoryCoordinate,
        full_path: &str,
    ) -> Result<Vec<RemoteBranch>> {
        let client = RefServiceClient::new(self.channel(coordinate, full_path)?);
        let request = self
            .request(FindAllBranchesRequest {
                repository: Some(repository(coordinate, full_path)),
                merged_only: false,
            })
            .await;

        let pages = client
            .find_all_branches(request)
            .await
            .map_err(|s| ProtocolError::from_status(FIND_ALL_BRANCHES, full_path, s))?
            .into_inner();

        collect_branches(pages, full_path).await
    }

    async fn fetch_blob(
        &self,
        coordinate: &RepositoryCoordinate,
        revision: &str,
        path: &str,
    ) -> Result<Option<Blob>> {
        let location = format!(
            "{}:{}@{}:{}",
            coordinate.storage_name, coordinate.relative_path, revision, path
        );
        let client = CommitServiceClient::new(self.channel(coordinate, &location)?);
        let request = self
            .request(TreeEntryRequest {
                repository: Some(repository(coordinate, "")),
                revision: revision.as_bytes().to_vec(),
                path: path.as_bytes().to_vec(),
                limit: 0,
            })
            .await;

        let entries = match client.tree_entry(request).await {
            Ok(response) => response.into_inner(),
            Err(status) if status.code() == Code::NotFound => return Ok(None),
            Err(status) => return Err(ProtocolError::from_status(TREE_ENTRY, &location, status).into()),
        };

        collect_blob(entries, &location).await
    }
}
