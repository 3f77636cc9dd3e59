//! JSON output formatting

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    pub data: T,
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Subcommand that produced the document
    pub command: String,

    /// RFC 3339 generation time
    pub timestamp: String,

    /// glartifacts version
    pub version: String,
}

impl<T> JsonOutput<T> {
    pub fn new(command: &str, data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                command: command.to_string(),
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(command: &str, data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(command, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepositoryCoordinate;

    #[test]
    fn test_json_output_carries_metadata() {
        let output = JsonOutput::new("projects", vec!["group/app"]);

        assert_eq!(output.data, vec!["group/app"]);
        assert_eq!(output.meta.command, "projects");
        assert_eq!(output.meta.version, env!("CARGO_PKG_VERSION"));
        assert!(!output.meta.timestamp.is_empty());
    }

    #[test]
    fn test_format_json_coordinate() {
        let coordinate = RepositoryCoordinate {
            project_id: 7,
            storage_name: "default".to_string(),
            relative_path: "group/app.git".to_string(),
        };

        let result = format_json("resolve", &coordinate).unwrap();

        assert!(result.contains("\"data\""));
        assert!(result.contains("\"project_id\": 7"));
        assert!(result.contains("\"relative_path\": \"group/app.git\""));
        assert!(result.contains("\"command\": \"resolve\""));
        assert!(result.contains("\"timestamp\""));
    }

    #[test]
    fn test_format_json_empty_list() {
        let items: Vec<RepositoryCoordinate> = vec![];
        let result = format_json("projects", &items).unwrap();

        assert!(result.contains("\"data\": []"));
    }
}
