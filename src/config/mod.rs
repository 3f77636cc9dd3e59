//! Configuration management for glartifacts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// GitLab PostgreSQL connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Gitaly endpoints and transport settings
    #[serde(default)]
    pub gitaly: GitalyConfig,

    /// Catalog behaviour
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Maximum pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Gitaly connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitalyConfig {
    /// Storage name -> Gitaly address (`tcp://host:port`)
    #[serde(default)]
    pub storages: BTreeMap<String, String>,

    /// Token sent with every RPC
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-call deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment deadline in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Client-side RPC rate limit
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_requests_per_second() -> u32 {
    50
}

impl Default for GitalyConfig {
    fn default() -> Self {
        Self {
            storages: BTreeMap::new(),
            token: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl GitalyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// What to do with a branch whose CI configuration parses but defines no jobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyJobsPolicy {
    /// Drop the project from this run, like a malformed configuration
    #[default]
    Skip,
    /// Keep the branch with an empty job list
    Keep,
}

/// Catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Projects processed at the same time
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Handling of configurations without jobs
    #[serde(default)]
    pub empty_jobs: EmptyJobsPolicy,

    /// Path of the CI configuration inside each repository
    #[serde(default = "default_ci_config_path")]
    pub ci_config_path: String,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_ci_config_path() -> String {
    ".gitlab-ci.yml".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            empty_jobs: EmptyJobsPolicy::default(),
            ci_config_path: default_ci_config_path(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".glartifacts").join("config.yaml"))
    }

    /// Resolve an optional override to the path that will be read
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Validate the settings needed to talk to the database and Gitaly
    pub fn validate(&self) -> Result<()> {
        if self.database.url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingDatabaseUrl.into());
        }

        if self.gitaly.storages.is_empty() {
            return Err(ConfigError::MissingStorages.into());
        }

        for (storage, address) in &self.gitaly.storages {
            if !address.starts_with("tcp://") {
                return Err(ConfigError::Invalid(format!(
                    "storage '{}' has unsupported address '{}' (expected tcp://host:port)",
                    storage, address
                ))
                .into());
            }
        }

        if self.gitaly.requests_per_second == 0 {
            return Err(
                ConfigError::Invalid("gitaly.requests_per_second must be > 0".to_string()).into(),
            );
        }

        if self.catalog.max_concurrent == 0 {
            return Err(
                ConfigError::Invalid("catalog.max_concurrent must be > 0".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Database URL with the password replaced, for display
    pub fn masked_database_url(&self) -> Option<String> {
        let url = self.database.url.as_deref()?;
        let Some((scheme, rest)) = url.split_once("://") else {
            return Some(url.to_string());
        };
        let Some((userinfo, host)) = rest.rsplit_once('@') else {
            return Some(url.to_string());
        };
        match userinfo.split_once(':') {
            Some((user, _)) => Some(format!("{}://{}:****@{}", scheme, user, host)),
            None => Some(url.to_string()),
        }
    }
}
