//! Reconciler - converges one resource at a time
//!
//! Decision table for an existing resource:
//!
//! | kind      | protected | force | result                           |
//! |-----------|-----------|-------|----------------------------------|
//! | directory | any       | any   | ownership/mode correction only   |
//! | file      | yes       | any   | ownership/mode correction only   |
//! | file      | no        | no    | ownership/mode correction only   |
//! | file      | no        | yes   | backup, rewrite, apply ownership |
//!
//! Content of an existing resource is never read or compared.

use crate::context::{Principals, resolve_desired};
use crate::error::{Call, OperationError};
use crate::resource::ResourceSpec;
use crate::types::{Action, OwnerGroupMode, ReconcileOutcome, ResourceKind};
use chrono::{DateTime, Local};
use std::fs::{self, DirBuilder, Metadata, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

/// Timestamp format used in backup file names
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Backup path for `path` taken at `at`: `<name>.bak.<YYYYMMDDHHMMSS>`
///
/// Two backups within the same second share a name; the later rename
/// replaces the earlier backup.
pub fn backup_path(path: &Path, at: DateTime<Local>) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        "{name}.bak.{}",
        at.format(BACKUP_TIMESTAMP_FORMAT)
    ))
}

/// Applies [`ResourceSpec`]s to the filesystem
pub struct Reconciler<'a> {
    principals: &'a dyn Principals,
}

impl<'a> Reconciler<'a> {
    pub fn new(principals: &'a dyn Principals) -> Self {
        Self { principals }
    }

    /// Bring `spec.path` into agreement with `spec`
    ///
    /// `content` is written verbatim when a file is created or overwritten
    /// and ignored for directories. `force_overwrite` only affects existing,
    /// non-protected files.
    pub fn reconcile(
        &self,
        spec: &ResourceSpec,
        content: &[u8],
        force_overwrite: bool,
    ) -> Result<ReconcileOutcome, OperationError> {
        self.reconcile_at(spec, content, force_overwrite, Local::now())
    }

    /// [`reconcile`](Self::reconcile) with the backup timestamp taken from `now`
    pub fn reconcile_at(
        &self,
        spec: &ResourceSpec,
        content: &[u8],
        force_overwrite: bool,
        now: DateTime<Local>,
    ) -> Result<ReconcileOutcome, OperationError> {
        log::debug!("Reconciling {}", spec.description());
        // Resolve names before touching anything so an unknown owner never
        // leaves a half-created resource behind.
        let desired = resolve_desired(self.principals, spec)?;

        let Some(metadata) = stat(&spec.path)? else {
            log::debug!("{} is absent, creating", spec.path.display());
            create(spec, content)?;
            apply_ownership(&spec.path, None, desired)?;
            return Ok(ReconcileOutcome::new(&spec.path, Action::Created));
        };

        check_kind(spec, &metadata)?;
        let current = OwnerGroupMode::from_metadata(&metadata);

        if !spec.is_directory() && force_overwrite && !spec.protected {
            let backup = backup_path(&spec.path, now);
            log::debug!(
                "Backing up {} to {}",
                spec.path.display(),
                backup.display()
            );
            fs::rename(&spec.path, &backup)
                .map_err(|e| OperationError::io(Call::Rename, &spec.path, e))?;
            create(spec, content)?;
            apply_ownership(&spec.path, None, desired)?;
            return Ok(
                ReconcileOutcome::new(&spec.path, Action::BackedUpAndOverwritten)
                    .with_prior(current)
                    .with_backup(backup),
            );
        }

        if current == desired {
            log::debug!("{} matches {}", spec.path.display(), desired);
            return Ok(ReconcileOutcome::new(&spec.path, Action::Preserved));
        }

        log::debug!(
            "{} drifted: {} -> {}",
            spec.path.display(),
            current,
            desired
        );
        apply_ownership(&spec.path, Some(current), desired)?;
        Ok(ReconcileOutcome::new(&spec.path, Action::PermissionsCorrected).with_prior(current))
    }
}

/// Metadata for `path`, or `None` if it does not exist
pub(crate) fn stat(path: &Path) -> Result<Option<Metadata>, OperationError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(OperationError::io(Call::Stat, path, e)),
    }
}

pub(crate) fn check_kind(spec: &ResourceSpec, metadata: &Metadata) -> Result<(), OperationError> {
    let matches = match spec.kind {
        ResourceKind::Directory => metadata.is_dir(),
        ResourceKind::File => metadata.is_file(),
    };

    if matches {
        Ok(())
    } else {
        Err(OperationError::KindMismatch {
            path: spec.path.clone(),
            expected: spec.kind.to_string(),
        })
    }
}

fn create(spec: &ResourceSpec, content: &[u8]) -> Result<(), OperationError> {
    match spec.kind {
        ResourceKind::Directory => DirBuilder::new()
            .recursive(true)
            .mode(spec.mode)
            .create(&spec.path)
            .map_err(|e| OperationError::io(Call::Mkdir, &spec.path, e)),
        ResourceKind::File => {
            // Open with the final mode so secrets are never briefly world-readable.
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(spec.mode)
                .open(&spec.path)
                .map_err(|e| OperationError::io(Call::Write, &spec.path, e))?;
            file.write_all(content)
                .and_then(|()| file.sync_all())
                .map_err(|e| OperationError::io(Call::Write, &spec.path, e))
        }
    }
}

/// Apply uid/gid and mode as two independent calls
///
/// With no `current` triple (fresh creation) the mode is always set, since
/// the process umask has already filtered the creation mode.
fn apply_ownership(
    path: &Path,
    current: Option<OwnerGroupMode>,
    desired: OwnerGroupMode,
) -> Result<(), OperationError> {
    let current = match current {
        Some(current) => current,
        None => stat(path)?
            .map(|m| OwnerGroupMode::from_metadata(&m))
            .ok_or_else(|| {
                OperationError::io(Call::Stat, path, io::Error::from(io::ErrorKind::NotFound))
            })?,
    };

    if !current.same_owner(&desired) {
        std::os::unix::fs::chown(path, Some(desired.uid), Some(desired.gid))
            .map_err(|e| OperationError::io(Call::Chown, path, e))?;
    }

    if current.mode != desired.mode {
        fs::set_permissions(path, Permissions::from_mode(desired.mode))
            .map_err(|e| OperationError::io(Call::Chmod, path, e))?;
    }

    Ok(())
}
