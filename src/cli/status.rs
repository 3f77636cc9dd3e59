//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::context::load_config;
use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "glartifacts Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;

    match load_config(opts) {
        Ok(config) => {
            println!("Config file: {}", config_path.display().to_string().cyan());
            println!();

            // Database status
            match config.masked_database_url() {
                Some(url) if !url.is_empty() => {
                    println!("{} Database: {}", "✓".green(), url);
                    println!(
                        "  {} max connections",
                        config.database.max_connections.to_string().dimmed()
                    );
                }
                _ => {
                    println!("{} Database URL not configured", "✗".red());
                    println!("  → Set 'database.url' or pass --database-url");
                }
            }

            // Gitaly storages
            if config.gitaly.storages.is_empty() {
                println!("{} No Gitaly storages configured", "✗".red());
                println!("  → Add entries under 'gitaly.storages'");
            } else {
                println!(
                    "{} Gitaly storages: {}",
                    "✓".green(),
                    config.gitaly.storages.len()
                );
                for (storage, address) in &config.gitaly.storages {
                    println!("  {} → {}", storage.bold(), address.cyan());
                }
            }

            if config.gitaly.token.is_some() {
                println!("{} Gitaly token configured", "✓".green());
            } else {
                println!("{} No Gitaly token (unauthenticated)", "○".dimmed());
            }

            println!(
                "{} Catalog: {} concurrent projects, CI config at {}",
                "○".dimmed(),
                config.catalog.max_concurrent,
                config.catalog.ci_config_path.cyan()
            );

            if let Err(err) = config.validate() {
                println!();
                println!("{} {}", "⚠".yellow(), err);
            }

            println!();
        }
        Err(err) => {
            println!("{} {}", "✗".red(), err);
            println!();
            println!(
                "Create {} to configure the database and Gitaly storages.",
                config_path.display().to_string().cyan()
            );
            println!();
        }
    }

    Ok(())
}
