//! `.gitlab-ci.yml` job name extraction

use std::collections::BTreeSet;

use serde_yaml::Value;

use crate::error::CiConfigError;

/// Top-level keys that configure the pipeline rather than define a job
pub const RESERVED_KEYWORDS: &[&str] = &[
    "image",
    "services",
    "stages",
    "types",
    "before_script",
    "after_script",
    "variables",
    "cache",
];

fn is_job_name(key: &str) -> bool {
    !key.starts_with('.')
        && !RESERVED_KEYWORDS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(key))
}

fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a CI configuration and return its job names.
///
/// `location` identifies the project and branch in error messages.
pub fn parse(raw: &[u8], location: &str) -> Result<BTreeSet<String>, CiConfigError> {
    let malformed = |reason: String| CiConfigError::Malformed {
        location: location.to_string(),
        reason,
    };

    let text = std::str::from_utf8(raw).map_err(|e| malformed(e.to_string()))?;
    let document: Value = serde_yaml::from_str(text).map_err(|e| malformed(e.to_string()))?;
    let Value::Mapping(mapping) = document else {
        return Err(malformed("top level is not a mapping".to_string()));
    };

    let jobs: BTreeSet<String> = mapping
        .keys()
        .filter_map(key_name)
        .filter(|key| is_job_name(key))
        .collect();

    if jobs.is_empty() {
        return Err(CiConfigError::NoJobs(location.to_string()));
    }
    Ok(jobs)
}
