//! SQL against the GitLab schema
//!
//! `namespaces.parent_id` is NULL for top-level groups and user namespaces, so
//! the lookups compare with `IS NOT DISTINCT FROM` to match a NULL parent.

/// Projects with retained artifacts, one row per project.
///
/// `routes` carries the full namespace path, which saves walking the
/// namespace tree once per project.
pub const PROJECTS_WITH_ARTIFACTS: &str = r#"
SELECT
    p.id::bigint                          AS project_id,
    p.path                                AS project_path,
    COALESCE(r.path, '')                  AS namespace_path,
    COUNT(a.id)::bigint                   AS artifact_count,
    COALESCE(SUM(a.size), 0)::bigint      AS artifact_size
FROM ci_job_artifacts a
JOIN projects p ON p.id = a.project_id
LEFT JOIN routes r ON r.source_id = p.namespace_id AND r.source_type = 'Namespace'
GROUP BY p.id, p.path, r.path
ORDER BY p.id
"#;

/// Branches with retained artifacts. Tag pipelines are left out.
pub const BRANCHES_WITH_ARTIFACTS: &str = r#"
SELECT DISTINCT
    b.project_id::bigint AS project_id,
    b.ref                AS branch_ref
FROM ci_builds b
JOIN ci_job_artifacts a ON a.job_id = b.id
WHERE b.tag IS NOT TRUE AND b.ref IS NOT NULL
ORDER BY 1, 2
"#;

pub const GET_NAMESPACE: &str = r#"
SELECT id::bigint
FROM namespaces
WHERE path = $1 AND parent_id IS NOT DISTINCT FROM $2
LIMIT 1
"#;

/// Project lookup; `project_repositories.disk_path` is set for hashed storage.
pub const GET_PROJECT: &str = r#"
SELECT
    p.id::bigint           AS project_id,
    p.repository_storage   AS storage_name,
    pr.disk_path           AS disk_path
FROM projects p
LEFT JOIN project_repositories pr ON pr.project_id = p.id
WHERE p.path = $1 AND p.namespace_id IS NOT DISTINCT FROM $2
LIMIT 1
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_queries_match_null_parents() {
        assert!(GET_NAMESPACE.contains("IS NOT DISTINCT FROM $2"));
        assert!(GET_PROJECT.contains("IS NOT DISTINCT FROM $2"));
    }

    #[test]
    fn test_inventory_columns_match_row_fields() {
        for column in [
            "project_id",
            "project_path",
            "namespace_path",
            "artifact_count",
            "artifact_size",
        ] {
            assert!(
                PROJECTS_WITH_ARTIFACTS.contains(&format!("AS {}", column)),
                "missing column {}",
                column
            );
        }
        assert!(BRANCHES_WITH_ARTIFACTS.contains("AS branch_ref"));
        assert!(GET_PROJECT.contains("AS disk_path"));
    }
}
