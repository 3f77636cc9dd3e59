//! Project path to repository coordinate resolution
//!
//! A full path such as `group/subgroup/app` is resolved by walking the
//! namespace chain from the root, then looking the project up inside the last
//! namespace. Nothing is cached here; callers decide whether to memoize.

use log::debug;

use crate::db::HostingDatabase;
use crate::error::{ResolveError, Result};
use crate::models::RepositoryCoordinate;

/// Resolve `full_path` against the current database state.
pub async fn resolve<D>(db: &D, full_path: &str) -> Result<RepositoryCoordinate>
where
    D: HostingDatabase + ?Sized,
{
    let mut segments: Vec<&str> = full_path.split('/').collect();
    let project_name = segments.pop().unwrap_or_default();
    if project_name.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return Err(ResolveError::NoProject(full_path.to_string()).into());
    }

    let mut parent_id = None;
    for namespace in segments {
        parent_id = Some(db.get_namespace(namespace, parent_id).await?.ok_or_else(|| {
            ResolveError::NamespaceNotFound {
                namespace: namespace.to_string(),
                full_path: full_path.to_string(),
            }
        })?);
    }

    let record = db
        .get_project(project_name, parent_id)
        .await?
        .ok_or_else(|| ResolveError::NoProject(full_path.to_string()))?;

    let relative_path = match record.disk_path.as_deref() {
        Some(disk_path) if !disk_path.is_empty() => format!("{}.git", disk_path),
        _ => format!("{}.git", full_path),
    };

    debug!(
        "Resolved {} to project {} on {}:{}",
        full_path, record.project_id, record.storage_name, relative_path
    );

    Ok(RepositoryCoordinate {
        project_id: record.project_id,
        storage_name: record.storage_name,
        relative_path,
    })
}
