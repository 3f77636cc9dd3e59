//! Project/branch catalog
//!
//! Builds, for a set of project paths, the branches of every project together
//! with the CI job names defined at each branch head. A project that cannot be
//! resolved, listed or whose CI configuration is unusable is skipped with a
//! warning; the rest of the batch carries on.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::{debug, info, warn};
use serde::Serialize;

use crate::ci_config;
use crate::config::{CatalogConfig, EmptyJobsPolicy};
use crate::db::HostingDatabase;
use crate::error::{CiConfigError, Result};
use crate::gitaly::RepositoryService;
use crate::memo::Memo;
use crate::models::{Branch, Project, RepositoryCoordinate, normalize_branch_name};
use crate::parallel::try_map_bounded;
use crate::resolver;

/// Job names per (project id, commit)
type JobMemo = Memo<(i64, String), Vec<String>>;

/// A candidate left out of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedProject {
    pub full_path: String,
    pub reason: String,
}

/// Result of one catalog run
#[derive(Debug, Default, Serialize)]
pub struct Catalog {
    pub projects: BTreeMap<i64, Project>,
    pub skipped: Vec<SkippedProject>,
    pub unused_exclusions: Vec<String>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn branch_count(&self) -> usize {
        self.projects.values().map(|p| p.branches.len()).sum()
    }
}

enum Outcome {
    Built(Project),
    Skipped(SkippedProject),
}

/// Catalog builder over a database and a repository service
pub struct ProjectBranchCatalog<'a, D: ?Sized, R: ?Sized> {
    db: &'a D,
    gitaly: &'a R,
    options: CatalogConfig,
}

impl<'a, D, R> ProjectBranchCatalog<'a, D, R>
where
    D: HostingDatabase + ?Sized,
    R: RepositoryService + ?Sized,
{
    pub fn new(db: &'a D, gitaly: &'a R, options: CatalogConfig) -> Self {
        Self { db, gitaly, options }
    }

    /// Build the catalog.
    ///
    /// With `all_projects`, the candidates are every project holding artifacts
    /// and `candidate_paths` is ignored. `exclude_paths` is always subtracted.
    /// Only database failures and other infrastructure errors are returned;
    /// per-project problems end up in [`Catalog::skipped`].
    pub async fn build(
        &self,
        candidate_paths: &BTreeSet<String>,
        all_projects: bool,
        exclude_paths: &BTreeSet<String>,
    ) -> Result<Catalog> {
        let mut candidates: BTreeSet<String> = if all_projects {
            self.db
                .projects_with_artifacts()
                .await?
                .iter()
                .map(|row| row.full_path())
                .collect()
        } else {
            candidate_paths.clone()
        };

        let mut unused_exclusions = Vec::new();
        for excluded in exclude_paths {
            if !candidates.remove(excluded) {
                warn!("Exclusion '{}' does not match any candidate project", excluded);
                unused_exclusions.push(excluded.clone());
            }
        }

        let artifact_branches: HashSet<(i64, String)> = self
            .db
            .branches_with_artifacts()
            .await?
            .into_iter()
            .map(|b| (b.project_id, normalize_branch_name(&b.branch_ref).to_string()))
            .collect();

        let memo = JobMemo::new();
        let outcomes = try_map_bounded(
            candidates.into_iter().collect(),
            self.options.max_concurrent,
            |full_path| self.process(full_path, &artifact_branches, &memo),
        )
        .await?;

        let mut catalog = Catalog {
            unused_exclusions,
            ..Catalog::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Built(project) => {
                    catalog.projects.insert(project.project_id, project);
                }
                Outcome::Skipped(skipped) => catalog.skipped.push(skipped),
            }
        }
        catalog.skipped.sort_by(|a, b| a.full_path.cmp(&b.full_path));

        debug!(
            "CI config lookups: {} hits, {} misses, {} distinct commits",
            memo.hits(),
            memo.misses(),
            memo.len()
        );
        info!(
            "Catalog built: {} projects, {} branches, {} skipped",
            catalog.len(),
            catalog.branch_count(),
            catalog.skipped.len()
        );

        Ok(catalog)
    }

    async fn process(
        &self,
        full_path: String,
        artifact_branches: &HashSet<(i64, String)>,
        memo: &JobMemo,
    ) -> Result<Outcome> {
        match self.build_project(&full_path, artifact_branches, memo).await {
            Ok(project) => Ok(Outcome::Built(project)),
            Err(err) if err.is_project_local() => {
                warn!("Skipping project {}: {}", full_path, err);
                Ok(Outcome::Skipped(SkippedProject {
                    full_path,
                    reason: err.to_string(),
                }))
            }
            Err(err) => Err(err),
        }
    }

    async fn build_project(
        &self,
        full_path: &str,
        artifact_branches: &HashSet<(i64, String)>,
        memo: &JobMemo,
    ) -> Result<Project> {
        let coordinate = resolver::resolve(self.db, full_path).await?;
        let remote_branches = self.gitaly.list_branches(&coordinate, full_path).await?;

        let mut project = Project::new(full_path, &coordinate);
        for remote in remote_branches {
            let has_artifacts =
                artifact_branches.contains(&(coordinate.project_id, remote.name.clone()));
            let mut branch = Branch::new(&remote.name, remote.commit).with_artifacts(has_artifacts);
            let location = project.branch_location(&branch.name);
            let commit = branch.commit.clone();

            let jobs = memo
                .get_or_try_insert_with((coordinate.project_id, commit.clone()), || {
                    self.load_job_names(&coordinate, &commit, &location)
                })
                .await?;

            if jobs.is_empty() && has_artifacts {
                warn!(
                    "No CI jobs found for {}; all artifacts for this branch will be considered removable",
                    location
                );
            }
            branch.set_job_names(jobs);
            project.add_branch(branch);
        }

        Ok(project)
    }

    async fn load_job_names(
        &self,
        coordinate: &RepositoryCoordinate,
        commit: &str,
        location: &str,
    ) -> Result<Vec<String>> {
        let path = &self.options.ci_config_path;
        let Some(blob) = self.gitaly.fetch_blob(coordinate, commit, path).await? else {
            debug!("No {} at {}", path, location);
            return Ok(Vec::new());
        };
        debug!(
            "Read {} at {} (blob {}, {} bytes)",
            path, location, blob.oid, blob.size
        );

        match ci_config::parse(&blob.data, location) {
            Ok(jobs) => Ok(jobs.into_iter().collect()),
            Err(CiConfigError::NoJobs(_)) if self.options.empty_jobs == EmptyJobsPolicy::Keep => {
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }
}
