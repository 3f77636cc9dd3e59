//! Projects command implementation

use tabled::Tabled;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::db::{ArtifactProject, HostingDatabase};
use crate::error::Result;
use crate::output::formatters::format_size;
use crate::output::{self, Formattable, json, table};

/// Inventory row for table display
#[derive(Tabled)]
struct ProjectDisplay {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "PROJECT")]
    path: String,
    #[tabled(rename = "ARTIFACTS")]
    count: i64,
    #[tabled(rename = "SIZE")]
    size: String,
}

impl From<&ArtifactProject> for ProjectDisplay {
    fn from(row: &ArtifactProject) -> Self {
        Self {
            id: row.project_id,
            path: row.full_path(),
            count: row.artifact_count,
            size: format_size(row.artifact_size),
        }
    }
}

impl Formattable for [ArtifactProject] {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => {
                let rows: Vec<ProjectDisplay> = self.iter().map(ProjectDisplay::from).collect();
                Ok(table::format_table_or(&rows, "No projects hold artifacts."))
            }
            OutputFormat::Json => Ok(json::format_json("projects", self)?),
        }
    }
}

/// Run the projects command
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let result = ctx.db.projects_with_artifacts().await;
    ctx.close().await;

    let mut projects = result?;
    projects.sort_by_key(|p| std::cmp::Reverse(p.artifact_size));
    output::print(projects.as_slice(), opts.format)
}
