//! Service account and group

use crate::config::ConfigSet;
use crate::engine::Journal;
use crate::error::ProvisionError;
use crate::identity::{IdentityManager, ServiceAccount};

/// Create the service group and user when absent
///
/// An existing account is never modified; a home directory that differs
/// from the base directory is reported as a warning.
pub fn ensure_identity(
    config: &ConfigSet,
    manager: &dyn IdentityManager,
    journal: &mut Journal,
) -> Result<(), ProvisionError> {
    let group = config.service_group.as_str();
    let user = config.service_user.as_str();

    let gid = manager
        .group_id(group)
        .map_err(|e| ProvisionError::external(format!("looking up group {group}"), e))?;
    match gid {
        Some(gid) => journal.note(&format!("Group {group} exists (gid {gid})")),
        None => {
            journal.note(&format!("Creating group {group}"));
            manager
                .create_group(group)
                .map_err(|e| ProvisionError::external(format!("creating group {group}"), e))?;
        }
    }

    let entry = manager
        .lookup_user(user)
        .map_err(|e| ProvisionError::external(format!("looking up user {user}"), e))?;
    match entry {
        Some(entry) => {
            log::debug!(
                "Found {} (uid {}, gid {}, shell {})",
                entry.name,
                entry.uid,
                entry.gid,
                entry.shell
            );
            journal.note(&format!("User {user} exists (uid {})", entry.uid));
            if entry.home != config.base_dir {
                journal.warn(format!(
                    "User {user} has home {} but the base directory is {}; leaving the account unchanged",
                    entry.home.display(),
                    config.base_dir.display()
                ));
            }
        }
        None => {
            journal.note(&format!("Creating user {user}"));
            let account = ServiceAccount {
                user,
                group,
                home: &config.base_dir,
            };
            manager
                .create_user(&account)
                .map_err(|e| ProvisionError::external(format!("creating user {user}"), e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeIdentity, test_config};
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_group_and_user_once() {
        let tmp = TempDir::new().unwrap();
        let identity = FakeIdentity::for_dir(tmp.path());
        let config = test_config(tmp.path(), &["core"]);

        let mut journal = Journal::new(false);
        ensure_identity(&config, &identity, &mut journal).unwrap();
        ensure_identity(&config, &identity, &mut journal).unwrap();

        assert_eq!(identity.created(), vec!["group:netkeep", "user:netkeep"]);
        let user = identity.lookup_user("netkeep").unwrap().unwrap();
        assert_eq!(user.home, config.base_dir);
        assert!(journal.warnings().is_empty());
    }

    #[test]
    fn test_existing_user_with_other_home_is_only_warned() {
        let tmp = TempDir::new().unwrap();
        let identity = FakeIdentity::for_dir(tmp.path());
        identity.add_group("netkeep");
        identity.add_user("netkeep", Path::new("/home/netkeep"));
        let config = test_config(tmp.path(), &["core"]);

        let mut journal = Journal::new(false);
        ensure_identity(&config, &identity, &mut journal).unwrap();

        assert!(identity.created().is_empty());
        assert_eq!(journal.warnings().len(), 1);
        assert!(journal.warnings()[0].message.contains("/home/netkeep"));
    }
}
