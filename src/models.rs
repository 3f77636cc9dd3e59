//! Project and branch records assembled by the catalog

use serde::Serialize;

const HEADS_PREFIX: &str = "refs/heads/";

/// Strip a leading `refs/heads/` (any case) from a ref name.
pub fn normalize_branch_name(name: &str) -> &str {
    match name.get(..HEADS_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(HEADS_PREFIX) => &name[HEADS_PREFIX.len()..],
        _ => name,
    }
}

/// Physical identity of a repository on a Gitaly storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryCoordinate {
    pub project_id: i64,
    pub storage_name: String,
    pub relative_path: String,
}

impl RepositoryCoordinate {
    /// Identifier Gitaly uses for hooks and logging
    pub fn gl_repository(&self) -> String {
        format!("project-{}", self.project_id)
    }
}

/// A named ref at a specific commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    pub commit: String,

    /// Whether the inventory holds artifacts for this branch
    pub has_artifacts: bool,

    /// `None` until the CI configuration was loaded
    pub job_names: Option<Vec<String>>,
}

impl Branch {
    pub fn new(name: &str, commit: impl Into<String>) -> Self {
        Self {
            name: normalize_branch_name(name).to_string(),
            commit: commit.into(),
            has_artifacts: false,
            job_names: None,
        }
    }

    pub fn with_artifacts(mut self, has_artifacts: bool) -> Self {
        self.has_artifacts = has_artifacts;
        self
    }

    /// Record the job names. Only the first call has an effect.
    pub fn set_job_names(&mut self, jobs: Vec<String>) {
        if self.job_names.is_none() {
            self.job_names = Some(jobs);
        }
    }

    /// Whether every artifact of this branch is orphaned
    pub fn all_artifacts_removable(&self) -> bool {
        self.job_names.as_ref().is_some_and(Vec::is_empty)
    }
}

/// A project and the branches discovered for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub project_id: i64,
    pub full_path: String,
    pub storage_name: String,
    pub relative_path: String,
    pub branches: Vec<Branch>,
}

impl Project {
    pub fn new(full_path: impl Into<String>, coordinate: &RepositoryCoordinate) -> Self {
        Self {
            project_id: coordinate.project_id,
            full_path: full_path.into(),
            storage_name: coordinate.storage_name.clone(),
            relative_path: coordinate.relative_path.clone(),
            branches: Vec::new(),
        }
    }

    pub fn add_branch(&mut self, branch: Branch) {
        self.branches.push(branch);
    }

    /// Human-readable location of a branch's CI configuration
    pub fn branch_location(&self, branch: &str) -> String {
        format!("{}@{}", self.full_path, branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinate() -> RepositoryCoordinate {
        RepositoryCoordinate {
            project_id: 42,
            storage_name: "default".to_string(),
            relative_path: "@hashed/73/47/7347.git".to_string(),
        }
    }

    #[test]
    fn test_normalize_branch_name() {
        assert_eq!(normalize_branch_name("refs/heads/main"), "main");
        assert_eq!(normalize_branch_name("REFS/HEADS/feature-x"), "feature-x");
        assert_eq!(normalize_branch_name("develop"), "develop");
        assert_eq!(normalize_branch_name("refs/tags/v1"), "refs/tags/v1");
        assert_eq!(normalize_branch_name("refs/heads/refs/heads/x"), "refs/heads/x");
        assert_eq!(normalize_branch_name(""), "");
    }

    #[test]
    fn test_normalize_does_not_split_multibyte_chars() {
        assert_eq!(normalize_branch_name("ré"), "ré");
        assert_eq!(normalize_branch_name("refs/headsé/x"), "refs/headsé/x");
    }

    #[test]
    fn test_gl_repository() {
        assert_eq!(coordinate().gl_repository(), "project-42");
    }

    #[test]
    fn test_branch_job_names_set_once() {
        let mut branch = Branch::new("refs/heads/main", "abc123");
        assert_eq!(branch.name, "main");
        assert!(branch.job_names.is_none());
        assert!(!branch.all_artifacts_removable());

        branch.set_job_names(vec!["build".to_string()]);
        branch.set_job_names(vec![]);
        assert_eq!(branch.job_names, Some(vec!["build".to_string()]));
    }

    #[test]
    fn test_branch_without_jobs_is_removable() {
        let mut branch = Branch::new("main", "abc123").with_artifacts(true);
        branch.set_job_names(vec![]);
        assert!(branch.all_artifacts_removable());
    }

    #[test]
    fn test_project_preserves_branch_order() {
        let mut project = Project::new("group/app", &coordinate());
        project.add_branch(Branch::new("zeta", "1"));
        project.add_branch(Branch::new("alpha", "2"));

        let names: Vec<_> = project.branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(project.relative_path, "@hashed/73/47/7347.git");
        assert_eq!(project.branch_location("alpha"), "group/app@alpha");
    }
}
