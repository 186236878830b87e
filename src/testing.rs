//! In-memory capabilities and fixtures for tests
//!
//! Every account name the fakes know resolves to the ids of the test's temp
//! directory, so ownership changes succeed without privileges.

use anyhow::{Result, bail};
use declarative::Principals;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{ConfigSet, ConfigSources, DEFAULT_SERVICE_ACCOUNT, ROOT_ACCOUNT, merge};
use crate::identity::{IdentityManager, ServiceAccount, UserEntry};
use crate::paths::{CREDENTIALS_TEMPLATE, INVENTORY_TEMPLATE};
use crate::vcs::{RepoTarget, VersionControl};

pub const INVENTORY_SEED: &[u8] = b"# hostname;model;state\n";
pub const CREDENTIALS_SEED: &[u8] = b"# username password enable-secret\n";

pub struct FakeIdentity {
    uid: u32,
    gid: u32,
    users: RefCell<BTreeMap<String, PathBuf>>,
    groups: RefCell<BTreeSet<String>>,
    created: RefCell<Vec<String>>,
}

impl FakeIdentity {
    /// Only `root` exists initially
    pub fn for_dir(dir: &Path) -> Self {
        let meta = fs::metadata(dir).unwrap();
        let identity = Self {
            uid: meta.uid(),
            gid: meta.gid(),
            users: RefCell::default(),
            groups: RefCell::default(),
            created: RefCell::default(),
        };
        identity.add_user(ROOT_ACCOUNT, Path::new("/root"));
        identity.add_group(ROOT_ACCOUNT);
        identity
    }

    /// `root` plus the default service group and user, homed at `dir`
    pub fn with_service_account(dir: &Path) -> Self {
        let identity = Self::for_dir(dir);
        identity.add_group(DEFAULT_SERVICE_ACCOUNT);
        identity.add_user(DEFAULT_SERVICE_ACCOUNT, dir);
        identity
    }

    pub fn add_user(&self, name: &str, home: &Path) {
        self.users
            .borrow_mut()
            .insert(name.to_string(), home.to_path_buf());
    }

    pub fn add_group(&self, name: &str) {
        self.groups.borrow_mut().insert(name.to_string());
    }

    /// Creations in call order, as `group:<name>` / `user:<name>`
    pub fn created(&self) -> Vec<String> {
        self.created.borrow().clone()
    }
}

impl Principals for FakeIdentity {
    fn user_id(&self, name: &str) -> Result<Option<u32>> {
        Ok(self.users.borrow().contains_key(name).then_some(self.uid))
    }

    fn group_id(&self, name: &str) -> Result<Option<u32>> {
        Ok(self.groups.borrow().contains(name).then_some(self.gid))
    }
}

impl IdentityManager for FakeIdentity {
    fn lookup_user(&self, name: &str) -> Result<Option<UserEntry>> {
        Ok(self.users.borrow().get(name).map(|home| UserEntry {
            name: name.to_string(),
            uid: self.uid,
            gid: self.gid,
            home: home.clone(),
            shell: crate::identity::NOLOGIN_SHELL.to_string(),
        }))
    }

    fn create_group(&self, name: &str) -> Result<()> {
        if !self.groups.borrow_mut().insert(name.to_string()) {
            bail!("group {name} already exists");
        }
        self.created.borrow_mut().push(format!("group:{name}"));
        Ok(())
    }

    fn create_user(&self, account: &ServiceAccount<'_>) -> Result<()> {
        if !self.groups.borrow().contains(account.group) {
            bail!("group {} does not exist", account.group);
        }
        if self.users.borrow().contains_key(account.user) {
            bail!("user {} already exists", account.user);
        }
        self.add_user(account.user, account.home);
        self.created.borrow_mut().push(format!("user:{}", account.user));
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeRepo {
    pub name: String,
    pub email: String,
    pub commits: Vec<String>,
    pub identity_sets: usize,
}

#[derive(Default)]
pub struct FakeVcs {
    repos: RefCell<BTreeMap<PathBuf, FakeRepo>>,
    fail_identity: Cell<bool>,
}

impl FakeVcs {
    pub fn repo(&self, path: &Path) -> Option<FakeRepo> {
        self.repos.borrow().get(path).cloned()
    }

    pub fn repo_count(&self) -> usize {
        self.repos.borrow().len()
    }

    /// Make `set_identity` fail from now on
    pub fn fail_identity(&self, fail: bool) {
        self.fail_identity.set(fail);
    }
}

impl VersionControl for FakeVcs {
    fn has_repository(&self, repo: &RepoTarget) -> bool {
        self.repos.borrow().contains_key(&repo.path)
    }

    fn init(&self, repo: &RepoTarget) -> Result<()> {
        self.repos
            .borrow_mut()
            .insert(repo.path.clone(), FakeRepo::default());
        Ok(())
    }

    fn set_identity(&self, repo: &RepoTarget, name: &str, email: &str) -> Result<()> {
        if self.fail_identity.get() {
            bail!("config file is locked");
        }
        let mut repos = self.repos.borrow_mut();
        let Some(state) = repos.get_mut(&repo.path) else {
            bail!("not a repository: {}", repo.path.display());
        };
        state.name = name.to_string();
        state.email = email.to_string();
        state.identity_sets += 1;
        Ok(())
    }

    fn commit_empty(&self, repo: &RepoTarget, message: &str) -> Result<()> {
        let mut repos = self.repos.borrow_mut();
        let Some(state) = repos.get_mut(&repo.path) else {
            bail!("not a repository: {}", repo.path.display());
        };
        state.commits.push(message.to_string());
        Ok(())
    }
}

/// Default configuration rooted inside `root`
pub fn test_config(root: &Path, groups: &[&str]) -> ConfigSet {
    let (mut config, _) = merge(&[], &root.join("templates"));
    config.groups = groups.iter().map(ToString::to_string).collect();
    config.base_dir = root.join("var/lib/netkeep");
    config.etc_dir = root.join("etc/netkeep");
    config.schedule_file = root.join("etc/cron.d/netkeep");
    config
}

pub fn write_templates(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(INVENTORY_TEMPLATE), INVENTORY_SEED).unwrap();
    fs::write(dir.join(CREDENTIALS_TEMPLATE), CREDENTIALS_SEED).unwrap();
}

/// A sandboxed host: override file, templates and fake capabilities
pub struct Fixture {
    pub tmp: TempDir,
    pub identity: FakeIdentity,
    pub vcs: FakeVcs,
}

impl Fixture {
    pub fn new(groups: &[&str]) -> Self {
        let tmp = TempDir::new().unwrap();
        let config = test_config(tmp.path(), groups);
        write_templates(&config.template_dir);

        let quoted: Vec<String> = groups.iter().map(|g| format!("\"{g}\"")).collect();
        let env = format!(
            "GROUPS=({})\nBASE_DIR={}\nETC_DIR={}\nSCHEDULE_FILE={}\n",
            quoted.join(" "),
            config.base_dir.display(),
            config.etc_dir.display(),
            config.schedule_file.display()
        );
        fs::create_dir_all(config.schedule_file.parent().unwrap()).unwrap();
        fs::write(tmp.path().join("netkeep.env"), env).unwrap();

        let identity = FakeIdentity::for_dir(tmp.path());
        Self {
            tmp,
            identity,
            vcs: FakeVcs::default(),
        }
    }

    pub fn sources(&self) -> ConfigSources {
        ConfigSources {
            env_file: Some(self.tmp.path().join("netkeep.env")),
            record_path: self.record_path(),
            template_dir: self.tmp.path().join("templates"),
        }
    }

    /// The configuration the fixture's sources resolve to
    pub fn config(&self) -> ConfigSet {
        crate::config::resolve(&self.sources()).unwrap().config
    }

    pub fn record_path(&self) -> PathBuf {
        self.tmp.path().join("etc/netkeep/netkeep.toml")
    }
}
