//! Local configuration repositories, one per provisioned group

use crate::config::ConfigSet;
use crate::engine::Journal;
use crate::error::ProvisionError;
use crate::paths::GroupLayout;
use crate::vcs::{RepoTarget, VersionControl};

pub const BASELINE_COMMIT_MESSAGE: &str = "Initial empty commit";

/// What happened to one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoStatus {
    /// New repository with identity and a baseline commit
    Initialized,
    /// Existing repository; identity set again
    IdentityRefreshed,
    /// Existing repository whose identity could not be refreshed
    RefreshFailed(String),
}

/// Initialize the repository at `repo` or refresh its identity
///
/// Failures while creating a repository are fatal. Failing to refresh an
/// existing one is reported as [`RepoStatus::RefreshFailed`].
pub fn ensure_repository(
    config: &ConfigSet,
    vcs: &dyn VersionControl,
    repo: &RepoTarget,
) -> Result<RepoStatus, ProvisionError> {
    let name = config.identity_name.as_str();
    let email = config.identity_email.as_str();
    let location = repo.path.display();

    if vcs.has_repository(repo) {
        return Ok(match vcs.set_identity(repo, name, email) {
            Ok(()) => RepoStatus::IdentityRefreshed,
            Err(e) => RepoStatus::RefreshFailed(format!("{e:#}")),
        });
    }

    vcs.init(repo)
        .map_err(|e| ProvisionError::external(format!("initializing repository {location}"), e))?;
    vcs.set_identity(repo, name, email).map_err(|e| {
        ProvisionError::external(format!("setting identity in repository {location}"), e)
    })?;
    vcs.commit_empty(repo, BASELINE_COMMIT_MESSAGE).map_err(|e| {
        ProvisionError::external(format!("creating baseline commit in {location}"), e)
    })?;

    Ok(RepoStatus::Initialized)
}

pub fn ensure_repositories(
    config: &ConfigSet,
    layouts: &[GroupLayout],
    vcs: &dyn VersionControl,
    journal: &mut Journal,
) -> Result<(), ProvisionError> {
    for layout in layouts {
        let repo = RepoTarget::new(layout.config_store(), &config.service_user);
        match ensure_repository(config, vcs, &repo)? {
            RepoStatus::Initialized => journal.note(&format!(
                "Initialized repository {} for group {}",
                repo.path.display(),
                layout.name
            )),
            RepoStatus::IdentityRefreshed => journal.note(&format!(
                "Repository {} exists; identity refreshed",
                repo.path.display()
            )),
            RepoStatus::RefreshFailed(reason) => journal.warn(format!(
                "Could not refresh identity in {}: {reason}",
                repo.path.display()
            )),
        }
    }
    Ok(())
}
