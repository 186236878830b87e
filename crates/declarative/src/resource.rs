//! Resource declarations - the desired state of one path

use crate::types::ResourceKind;
use std::path::{Path, PathBuf};

/// Desired state of a managed filesystem resource
///
/// Owner and group are names, resolved through a
/// [`Principals`](crate::Principals) implementation at reconcile time.
///
/// # Example
///
/// ```ignore
/// use declarative::ResourceSpec;
///
/// let store = ResourceSpec::file("/etc/netkeep/credentials", "netkeep", "netkeep", 0o600)
///     .protected();
/// assert!(store.protected);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    pub path: PathBuf,
    pub owner: String,
    pub group: String,
    pub mode: u32,
    pub kind: ResourceKind,
    /// Content is never replaced once the resource exists
    pub protected: bool,
}

impl ResourceSpec {
    pub fn directory(path: impl AsRef<Path>, owner: &str, group: &str, mode: u32) -> Self {
        Self::new(path, owner, group, mode, ResourceKind::Directory)
    }

    pub fn file(path: impl AsRef<Path>, owner: &str, group: &str, mode: u32) -> Self {
        Self::new(path, owner, group, mode, ResourceKind::File)
    }

    fn new(path: impl AsRef<Path>, owner: &str, group: &str, mode: u32, kind: ResourceKind) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            owner: owner.to_string(),
            group: group.to_string(),
            mode: mode & 0o7777,
            kind,
            protected: false,
        }
    }

    /// Mark the resource's content as immutable after first creation
    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ResourceKind::Directory
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        format!(
            "{} {} ({}:{} {:04o}{})",
            self.kind,
            self.path.display(),
            self.owner,
            self.group,
            self.mode,
            if self.protected { ", protected" } else { "" }
        )
    }
}
