//! Catalog command implementation

use std::collections::BTreeSet;

use colored::Colorize;
use log::info;
use tabled::Tabled;

use crate::catalog::{Catalog, ProjectBranchCatalog};
use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::Result;
use crate::models::Branch;
use crate::output::formatters::{format_jobs, short_commit};
use crate::output::{self, Formattable, json, table};

/// One branch per row
#[derive(Tabled)]
struct BranchDisplay {
    #[tabled(rename = "PROJECT")]
    project: String,
    #[tabled(rename = "BRANCH")]
    branch: String,
    #[tabled(rename = "COMMIT")]
    commit: String,
    #[tabled(rename = "ARTIFACTS")]
    artifacts: String,
    #[tabled(rename = "JOBS")]
    jobs: String,
}

fn artifact_state(branch: &Branch) -> &'static str {
    match (branch.has_artifacts, branch.all_artifacts_removable()) {
        (false, _) => "no",
        (true, true) => "orphaned",
        (true, false) => "yes",
    }
}

fn branch_rows(catalog: &Catalog) -> Vec<BranchDisplay> {
    catalog
        .projects
        .values()
        .flat_map(|project| {
            project.branches.iter().map(move |branch| BranchDisplay {
                project: project.full_path.clone(),
                branch: branch.name.clone(),
                commit: short_commit(&branch.commit).to_string(),
                artifacts: artifact_state(branch).to_string(),
                jobs: format_jobs(branch.job_names.as_deref()),
            })
        })
        .collect()
}

impl Formattable for Catalog {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::format_json("catalog", self)?),
            OutputFormat::Table => {
                let mut out = table::format_table_or(&branch_rows(self), "No branches found.");

                if !self.skipped.is_empty() {
                    out.push_str(&format!(
                        "\n\n{} {} project(s) skipped:",
                        "⚠".yellow(),
                        self.skipped.len()
                    ));
                    for skipped in &self.skipped {
                        out.push_str(&format!(
                            "\n  {} {}",
                            skipped.full_path.bold(),
                            skipped.reason.dimmed()
                        ));
                    }
                }

                if !self.unused_exclusions.is_empty() {
                    out.push_str(&format!(
                        "\n\n{} Exclusions matching no project: {}",
                        "○".dimmed(),
                        self.unused_exclusions.join(", ")
                    ));
                }

                Ok(out)
            }
        }
    }
}

/// Run the catalog command
pub async fn run(
    opts: &GlobalOptions,
    paths: Vec<String>,
    all: bool,
    exclude: Vec<String>,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let result = build(&ctx, paths, all, exclude).await;
    ctx.close().await;

    output::print(&result?, opts.format)
}

async fn build(
    ctx: &CommandContext,
    paths: Vec<String>,
    all: bool,
    exclude: Vec<String>,
) -> Result<Catalog> {
    let gitaly = ctx.open_gitaly()?;
    let candidates: BTreeSet<String> = paths.into_iter().collect();
    let exclude: BTreeSet<String> = exclude.into_iter().collect();

    info!(
        "Cataloging {}",
        if all {
            "all projects with artifacts".to_string()
        } else {
            format!("{} project(s)", candidates.len())
        }
    );

    let catalog = ProjectBranchCatalog::new(&ctx.db, &gitaly, ctx.config.catalog.clone())
        .build(&candidates, all, &exclude)
        .await;
    gitaly.close();
    catalog
}
