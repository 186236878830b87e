//! Version control capability
//!
//! Local repositories only. Nothing here ever adds, changes or contacts a
//! remote.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::sudo::RunAs;

/// A repository location and the account that owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub path: PathBuf,
    pub owner: String,
}

impl RepoTarget {
    pub fn new(path: impl AsRef<Path>, owner: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            owner: owner.to_string(),
        }
    }
}

pub trait VersionControl {
    /// Whether a repository marker already exists at the target
    fn has_repository(&self, repo: &RepoTarget) -> bool;

    fn init(&self, repo: &RepoTarget) -> Result<()>;

    /// Set the author name and email used for commits in this repository
    fn set_identity(&self, repo: &RepoTarget, name: &str, email: &str) -> Result<()>;

    /// Record a commit with no changes
    fn commit_empty(&self, repo: &RepoTarget, message: &str) -> Result<()>;
}

/// `git` on the host
#[derive(Debug, Clone)]
pub struct GitClient {
    /// Run git as the repository owner instead of the invoking user
    impersonate: bool,
}

impl GitClient {
    pub fn new(impersonate: bool) -> Self {
        Self { impersonate }
    }

    fn runner(&self, repo: &RepoTarget) -> RunAs {
        if self.impersonate {
            RunAs::user(&repo.owner)
        } else {
            RunAs::invoker()
        }
    }

    fn git(&self, repo: &RepoTarget, args: &[&str]) -> Result<()> {
        let path = repo.path.to_string_lossy();
        let mut argv = vec!["-C", path.as_ref()];
        argv.extend_from_slice(args);
        self.runner(repo).run_checked("git", &argv)
    }
}

impl VersionControl for GitClient {
    fn has_repository(&self, repo: &RepoTarget) -> bool {
        repo.path.join(".git").exists()
    }

    fn init(&self, repo: &RepoTarget) -> Result<()> {
        self.git(repo, &["init", "--quiet"])
    }

    fn set_identity(&self, repo: &RepoTarget, name: &str, email: &str) -> Result<()> {
        self.git(repo, &["config", "user.name", name])?;
        self.git(repo, &["config", "user.email", email])
    }

    fn commit_empty(&self, repo: &RepoTarget, message: &str) -> Result<()> {
        self.git(
            repo,
            &["commit", "--allow-empty", "--quiet", "--message", message],
        )
    }
}
