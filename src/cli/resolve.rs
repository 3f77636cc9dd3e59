//! Resolve command implementation

use tabled::Tabled;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::Result;
use crate::models::RepositoryCoordinate;
use crate::output::{self, Formattable, json, table};
use crate::resolver;

/// Coordinate for table display
#[derive(Tabled)]
struct CoordinateDisplay {
    #[tabled(rename = "PROJECT ID")]
    project_id: i64,
    #[tabled(rename = "STORAGE")]
    storage: String,
    #[tabled(rename = "RELATIVE PATH")]
    relative_path: String,
    #[tabled(rename = "GL_REPOSITORY")]
    gl_repository: String,
}

impl From<&RepositoryCoordinate> for CoordinateDisplay {
    fn from(coordinate: &RepositoryCoordinate) -> Self {
        Self {
            project_id: coordinate.project_id,
            storage: coordinate.storage_name.clone(),
            relative_path: coordinate.relative_path.clone(),
            gl_repository: coordinate.gl_repository(),
        }
    }
}

impl Formattable for RepositoryCoordinate {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(table::format_table(&[CoordinateDisplay::from(self)])),
            OutputFormat::Json => Ok(json::format_json("resolve", self)?),
        }
    }
}

/// Run the resolve command
pub async fn run(opts: &GlobalOptions, path: &str) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let result = resolver::resolve(&ctx.db, path).await;
    ctx.close().await;

    output::print(&result?, opts.format)
}
