//! Core types for declarative resource reconciliation

use std::fmt;
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

/// Kind of filesystem object a resource describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Directory,
    File,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => f.write_str("directory"),
            Self::File => f.write_str("file"),
        }
    }
}

/// Numeric ownership and permission bits of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerGroupMode {
    pub uid: u32,
    pub gid: u32,
    /// Permission bits only (`0o7777` mask), never the file type
    pub mode: u32,
}

impl OwnerGroupMode {
    pub fn new(uid: u32, gid: u32, mode: u32) -> Self {
        Self {
            uid,
            gid,
            mode: mode & 0o7777,
        }
    }

    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self::new(metadata.uid(), metadata.gid(), metadata.mode())
    }

    pub fn same_owner(&self, other: &Self) -> bool {
        self.uid == other.uid && self.gid == other.gid
    }
}

impl fmt::Display for OwnerGroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {:04o}", self.uid, self.gid, self.mode)
    }
}

/// What the reconciler did to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Resource did not exist and was created
    Created,
    /// Resource existed and already matched
    Preserved,
    /// Resource existed; ownership or mode was corrected, content untouched
    PermissionsCorrected,
    /// Resource was never considered because its name is not a valid identifier
    SkippedInvalidName,
    /// Existing file was renamed to a backup and rewritten
    BackedUpAndOverwritten,
}

impl Action {
    /// Whether anything on disk changed
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::PermissionsCorrected | Self::BackedUpAndOverwritten
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Preserved => "preserved",
            Self::PermissionsCorrected => "permissions corrected",
            Self::SkippedInvalidName => "skipped (invalid name)",
            Self::BackedUpAndOverwritten => "backed up and overwritten",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of reconciling one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub target: PathBuf,
    pub action: Action,
    /// Ownership and mode before a correction or overwrite
    pub prior: Option<OwnerGroupMode>,
    /// Where the previous content went, for `BackedUpAndOverwritten`
    pub backup: Option<PathBuf>,
}

impl ReconcileOutcome {
    pub fn new(target: impl Into<PathBuf>, action: Action) -> Self {
        Self {
            target: target.into(),
            action,
            prior: None,
            backup: None,
        }
    }

    pub fn with_prior(mut self, prior: OwnerGroupMode) -> Self {
        self.prior = Some(prior);
        self
    }

    pub fn with_backup(mut self, backup: impl Into<PathBuf>) -> Self {
        self.backup = Some(backup.into());
        self
    }

    /// Outcome for a named unit that failed identifier validation
    pub fn skipped_invalid(target: impl Into<PathBuf>) -> Self {
        Self::new(target, Action::SkippedInvalidName)
    }
}

/// Counts of outcomes by action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeSummary {
    pub created: usize,
    pub preserved: usize,
    pub corrected: usize,
    pub skipped: usize,
    pub backed_up: usize,
}

impl OutcomeSummary {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a ReconcileOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.add(outcome.action);
        }
        summary
    }

    pub fn add(&mut self, action: Action) {
        match action {
            Action::Created => self.created += 1,
            Action::Preserved => self.preserved += 1,
            Action::PermissionsCorrected => self.corrected += 1,
            Action::SkippedInvalidName => self.skipped += 1,
            Action::BackedUpAndOverwritten => self.backed_up += 1,
        }
    }

    /// Total number of resources that changed on disk
    pub fn total_changes(&self) -> usize {
        self.created + self.corrected + self.backed_up
    }

    /// Total number of outcomes recorded
    pub fn total(&self) -> usize {
        self.created + self.preserved + self.corrected + self.skipped + self.backed_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_is_masked_to_permission_bits() {
        let ogm = OwnerGroupMode::new(0, 0, 0o100_640);
        assert_eq!(ogm.mode, 0o640);
        assert_eq!(ogm.to_string(), "0:0 0640");
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            ReconcileOutcome::new("/a", Action::Created),
            ReconcileOutcome::new("/b", Action::Preserved),
            ReconcileOutcome::new("/c", Action::PermissionsCorrected),
            ReconcileOutcome::skipped_invalid("bad name"),
            ReconcileOutcome::new("/d", Action::BackedUpAndOverwritten),
        ];

        let summary = OutcomeSummary::from_outcomes(&outcomes);
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.total_changes(), 3);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_action_classification() {
        assert!(Action::Created.is_change());
        assert!(Action::BackedUpAndOverwritten.is_change());
        assert!(Action::PermissionsCorrected.is_change());
        assert!(!Action::Preserved.is_change());
        assert!(!Action::SkippedInvalidName.is_change());
    }
}
