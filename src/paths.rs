//! Centralized path resolution for netkeep
//!
//! # Environment Variables
//!
//! - `NETKEEP_ENV_FILE` - Override file read before the persisted record
//! - `NETKEEP_CONFIG` - Location of the persisted configuration record
//! - `NETKEEP_TEMPLATE_DIR` - Directory holding the seed templates
//!
//! # Layout
//!
//! ```text
//! <base_dir>/                    service home, 0750
//!   <group>/                     0750
//!     configs/                   configuration store (local repository)
//!     logs/
//!     status/
//!     inventory.db               seeded once from inventory.template, 0640
//! <etc_dir>/credentials          seeded once from credentials.template, 0600
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for the override file
pub const ENV_ENV_FILE: &str = "NETKEEP_ENV_FILE";

/// Environment variable for the persisted record location
pub const ENV_CONFIG: &str = "NETKEEP_CONFIG";

/// Environment variable for the template directory
pub const ENV_TEMPLATE_DIR: &str = "NETKEEP_TEMPLATE_DIR";

/// Override file looked up in the working directory when none is given
pub const DEFAULT_ENV_FILE: &str = "netkeep.env";

/// Fixed location of the persisted configuration record
pub const DEFAULT_RECORD_PATH: &str = "/etc/netkeep/netkeep.toml";

pub const INVENTORY_TEMPLATE: &str = "inventory.template";
pub const CREDENTIALS_TEMPLATE: &str = "credentials.template";

pub const CONFIG_STORE_DIR: &str = "configs";
pub const LOGS_DIR: &str = "logs";
pub const STATUS_DIR: &str = "status";
pub const INVENTORY_FILE: &str = "inventory.db";
pub const CREDENTIALS_FILE: &str = "credentials";

/// Default template directory: `templates/` next to the running binary
pub fn default_template_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Could not determine executable path")?;
    let dir = exe
        .parent()
        .context("Executable path has no parent directory")?
        .join("templates");
    log::debug!("Using default template dir: {}", dir.display());
    Ok(dir)
}

/// Make a path absolute against the working directory without touching the filesystem
pub fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Could not resolve {}", path.display()))
}

/// Paths derived from one group name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    pub name: String,
    pub root: PathBuf,
}

impl GroupLayout {
    pub fn new(base_dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            root: base_dir.join(name),
        }
    }

    /// Configuration store; also hosts the group's local repository
    pub fn config_store(&self) -> PathBuf {
        self.root.join(CONFIG_STORE_DIR)
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn status(&self) -> PathBuf {
        self.root.join(STATUS_DIR)
    }

    pub fn inventory(&self) -> PathBuf {
        self.root.join(INVENTORY_FILE)
    }

    /// Fixed subdirectories in creation order
    pub fn subdirectories(&self) -> [PathBuf; 3] {
        [self.config_store(), self.logs(), self.status()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_layout() {
        let layout = GroupLayout::new(Path::new("/var/lib/netkeep"), "core");
        assert_eq!(layout.root, PathBuf::from("/var/lib/netkeep/core"));
        assert_eq!(
            layout.subdirectories(),
            [
                PathBuf::from("/var/lib/netkeep/core/configs"),
                PathBuf::from("/var/lib/netkeep/core/logs"),
                PathBuf::from("/var/lib/netkeep/core/status"),
            ]
        );
        assert_eq!(
            layout.inventory(),
            PathBuf::from("/var/lib/netkeep/core/inventory.db")
        );
    }

    #[test]
    fn test_absolute_keeps_absolute_paths() {
        assert_eq!(
            absolute(Path::new("/etc/netkeep")).unwrap(),
            PathBuf::from("/etc/netkeep")
        );
        assert!(absolute(Path::new("templates")).unwrap().is_absolute());
    }
}
