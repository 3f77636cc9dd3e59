//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod catalog;
pub mod context;
pub mod projects;
pub mod resolve;
pub mod status;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// glartifacts - find the CI jobs still defined on every branch of a GitLab project
#[derive(Parser, Debug)]
#[command(name = "glartifacts")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "GLARTIFACTS_FORMAT",
        default_value = "table",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "GLARTIFACTS_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the GitLab database URL
    #[arg(long, global = true, env = "GLARTIFACTS_DATABASE_URL", hide_env = true)]
    pub database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "GLARTIFACTS_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show configuration status
    Status,

    /// Display version information
    Version,

    /// List projects that still hold build artifacts
    Projects,

    /// Show where a project's repository lives
    Resolve {
        /// Full project path, e.g. group/subgroup/project
        path: String,
    },

    /// List branches and their CI jobs for the given projects
    #[command(after_help = "EXAMPLES:\n  \
        glartifacts catalog group/app group/lib\n  \
        glartifacts catalog --all --exclude group/huge-monorepo\n  \
        glartifacts --format json catalog --all")]
    Catalog {
        /// Project paths to catalog
        #[arg(required_unless_present = "all")]
        paths: Vec<String>,

        /// Catalog every project that holds artifacts
        #[arg(long, conflicts_with = "paths")]
        all: bool,

        /// Project path to leave out (repeatable)
        #[arg(long, short = 'x', value_name = "PATH")]
        exclude: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_catalog_collects_paths_and_exclusions() {
        let cli = Cli::parse_from([
            "glartifacts",
            "catalog",
            "group/a",
            "group/b",
            "--exclude",
            "group/c",
            "-x",
            "group/d",
        ]);

        match cli.command {
            Commands::Catalog {
                paths,
                all,
                exclude,
            } => {
                assert_eq!(paths, vec!["group/a", "group/b"]);
                assert!(!all);
                assert_eq!(exclude, vec!["group/c", "group/d"]);
            }
            other => panic!("Expected Catalog, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_all_rejects_paths() {
        let result = Cli::try_parse_from(["glartifacts", "catalog", "--all", "group/a"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_catalog_requires_paths_or_all() {
        assert!(Cli::try_parse_from(["glartifacts", "catalog"]).is_err());
        assert!(Cli::try_parse_from(["glartifacts", "catalog", "--all"]).is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["glartifacts", "resolve", "group/app", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
