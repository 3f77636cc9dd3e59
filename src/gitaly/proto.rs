//! Gitaly protocol messages and RPC stubs
//!
//! Only the messages and fields read or written by this crate are declared.
//! Field numbers follow `shared.proto`, `ref.proto` and `commit.proto` from
//! the Gitaly repository; unknown fields sent by the server are skipped by
//! prost.

use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{Request, Response, Status, Streaming};

/// `TreeEntryResponse.ObjectType.BLOB`
pub const OBJECT_TYPE_BLOB: i32 = 1;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Repository {
    #[prost(string, tag = "2")]
    pub storage_name: String,
    #[prost(string, tag = "3")]
    pub relative_path: String,
    #[prost(string, tag = "6")]
    pub gl_repository: String,
    #[prost(string, tag = "8")]
    pub gl_project_path: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GitCommit {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindAllBranchesRequest {
    #[prost(message, optional, tag = "1")]
    pub repository: Option<Repository>,
    #[prost(bool, tag = "2")]
    pub merged_only: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FindAllBranchesResponse {
    #[prost(message, repeated, tag = "1")]
    pub branches: Vec<find_all_branches_response::Branch>,
}

pub mod find_all_branches_response {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Branch {
        #[prost(bytes = "vec", tag = "1")]
        pub name: Vec<u8>,
        #[prost(message, optional, tag = "2")]
        pub target: Option<super::GitCommit>,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TreeEntryRequest {
    #[prost(message, optional, tag = "1")]
    pub repository: Option<Repository>,
    #[prost(bytes = "vec", tag = "2")]
    pub revision: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub path: Vec<u8>,
    /// 0 means no limit
    #[prost(int64, tag = "4")]
    pub limit: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TreeEntryResponse {
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(string, tag = "2")]
    pub oid: String,
    #[prost(int64, tag = "3")]
    pub size: i64,
    #[prost(int32, tag = "4")]
    pub mode: i32,
    #[prost(bytes = "vec", tag = "5")]
    pub data: Vec<u8>,
}

async fn server_streaming<Req, Resp>(
    channel: Channel,
    path: &'static str,
    request: Request<Req>,
) -> Result<Response<Streaming<Resp>>, Status>
where
    Req: ::prost::Message + Send + Sync + 'static,
    Resp: ::prost::Message + Default + Send + Sync + 'static,
{
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready()
        .await
        .map_err(|e| Status::unavailable(format!("Service was not ready: {}", e)))?;
    let codec = tonic_prost::ProstCodec::default();
    grpc.server_streaming(request, PathAndQuery::from_static(path), codec)
        .await
}

/// `gitaly.RefService` client
#[derive(Clone)]
pub struct RefServiceClient {
    channel: Channel,
}

impl RefServiceClient {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    pub async fn find_all_branches(
        &self,
        request: Request<FindAllBranchesRequest>,
    ) -> Result<Response<Streaming<FindAllBranchesResponse>>, Status> {
        server_streaming(
            self.channel.clone(),
            "/gitaly.RefService/FindAllBranches",
            request,
        )
        .await
    }
}

/// `gitaly.CommitService` client
#[derive(Clone)]
pub struct CommitServiceClient {
    channel: Channel,
}

impl CommitServiceClient {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    pub async fn tree_entry(
        &self,
        request: Request<TreeEntryRequest>,
    ) -> Result<Response<Streaming<TreeEntryResponse>>, Status> {
        server_streaming(
            self.channel.clone(),
            "/gitaly.CommitService/TreeEntry",
            request,
        )
        .await
    }
}
