//! Error types for glartifacts

use thiserror::Error;

/// Result type alias for glartifacts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    CiConfig(#[from] CiConfigError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Gitaly transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error concerns a single candidate project.
    ///
    /// The catalog skips a project on these and keeps going; everything else
    /// aborts the run.
    pub fn is_project_local(&self) -> bool {
        matches!(
            self,
            Error::Resolve(_) | Error::Protocol(_) | Error::CiConfig(_)
        )
    }
}

/// Failures turning a project path into a repository coordinate
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Namespace '{namespace}' not found while resolving {full_path}")]
    NamespaceNotFound { namespace: String, full_path: String },

    #[error("Project not found: {0}")]
    NoProject(String),
}

/// Gitaly transport failures and protocol contract violations
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("{rpc} failed for {path}: {code} ({message})")]
    Rpc {
        rpc: &'static str,
        path: String,
        code: tonic::Code,
        message: String,
    },

    #[error("FindAllBranches returned no branches for {0}")]
    NoBranches(String),

    #[error("FindAllBranches returned branch '{branch}' without a target commit for {path}")]
    MissingCommit { branch: String, path: String },

    #[error("{rpc} returned an empty response stream for {path}")]
    EmptyResponse { rpc: &'static str, path: String },

    #[error("No Gitaly address configured for storage '{storage}' ({path})")]
    UnknownStorage { storage: String, path: String },
}

impl ProtocolError {
    /// Wrap a gRPC status returned by `rpc` for the repository at `path`.
    pub fn from_status(rpc: &'static str, path: &str, status: tonic::Status) -> Self {
        ProtocolError::Rpc {
            rpc,
            path: path.to_string(),
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

/// A CI configuration blob that cannot be used to derive job names
#[derive(Debug, Error)]
pub enum CiConfigError {
    #[error("Invalid CI configuration at {location}: {reason}")]
    Malformed { location: String, reason: String },

    #[error("CI configuration at {0} defines no jobs")]
    NoJobs(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Database URL not configured. Set `database.url` or pass --database-url.")]
    MissingDatabaseUrl,

    #[error("No Gitaly storages configured. Add at least one entry under `gitaly.storages`.")]
    MissingStorages,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
