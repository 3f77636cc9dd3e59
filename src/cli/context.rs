//! Command execution context
//!
//! Loads configuration and opens the GitLab database for commands that need
//! it, so handlers only deal with their own work.

use log::debug;

use crate::cli::{GlobalOptions, OutputFormat};
use crate::config::Config;
use crate::db::PgHostingDatabase;
use crate::error::Result;
use crate::gitaly::GitalySession;

/// Context for command execution containing config, database and output format.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Pooled connection to the GitLab database
    pub db: PgHostingDatabase,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Load and validate configuration, then connect to the database.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded, fails validation, or the
    /// database is unreachable.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = load_config(opts)?;
        config.validate()?;

        debug!(
            "Connecting to {}",
            config.masked_database_url().unwrap_or_default()
        );
        let db = PgHostingDatabase::connect(&config.database).await?;

        Ok(Self {
            config,
            db,
            format: opts.format,
        })
    }

    /// Open Gitaly connections for the configured storages.
    pub fn open_gitaly(&self) -> Result<GitalySession> {
        GitalySession::open(&self.config.gitaly)
    }

    /// Release the database pool.
    pub async fn close(self) {
        self.db.close().await;
    }
}

/// Load configuration and apply command-line overrides.
pub fn load_config(opts: &GlobalOptions) -> Result<Config> {
    let mut config = Config::load_at(opts.config_ref())?;
    if let Some(url) = opts.database_url_ref() {
        config.database.url = Some(url.to_string());
    }
    Ok(config)
}
