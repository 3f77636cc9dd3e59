//! glartifacts - find the CI jobs still defined on every branch of a GitLab project

use clap::Parser;
use env_logger::Env;

mod catalog;
mod ci_config;
mod cli;
mod config;
mod db;
mod error;
mod gitaly;
mod memo;
mod models;
mod output;
mod parallel;
mod resolver;

use cli::{Cli, Commands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over the `--debug` default
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("glartifacts version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Projects => cli::projects::run(&opts).await,
        Commands::Resolve { path } => cli::resolve::run(&opts, &path).await,
        Commands::Catalog {
            paths,
            all,
            exclude,
        } => cli::catalog::run(&opts, paths, all, exclude).await,
    }
}
