//! Host account database access
//!
//! Lookups go through `getent` so NSS sources (LDAP, sssd) are honored;
//! creation uses `groupadd`/`useradd`.

use anyhow::{Context, Result, bail};
use declarative::Principals;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::runner;

/// Shell for the service account; impersonated commands do not need a login shell
pub const NOLOGIN_SHELL: &str = "/usr/sbin/nologin";

/// `getent` exit status for "key not found"
const GETENT_NOT_FOUND: i32 = 2;

/// One entry of the passwd database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
    pub shell: String,
}

/// The service account to create
#[derive(Debug, Clone, Copy)]
pub struct ServiceAccount<'a> {
    pub user: &'a str,
    pub group: &'a str,
    pub home: &'a Path,
}

/// Account management capability
pub trait IdentityManager: Principals {
    fn lookup_user(&self, name: &str) -> Result<Option<UserEntry>>;

    fn create_group(&self, name: &str) -> Result<()>;

    /// Create a system user with no password, no login shell and no home
    /// directory creation; the home path is managed separately
    fn create_user(&self, account: &ServiceAccount<'_>) -> Result<()>;
}

/// The host's real account database
#[derive(Debug, Default)]
pub struct SystemIdentity;

impl SystemIdentity {
    pub fn new() -> Self {
        Self
    }

    fn getent(database: &str, key: &str) -> Result<Option<String>> {
        let output = Command::new("getent")
            .args([database, key])
            .output()
            .with_context(|| format!("Failed to execute: getent {database} {key}"))?;

        if output.status.code() == Some(GETENT_NOT_FOUND) {
            return Ok(None);
        }

        let stdout = runner::check_output("getent", &output)?;
        Ok(stdout.lines().next().map(str::to_string))
    }
}

impl Principals for SystemIdentity {
    fn user_id(&self, name: &str) -> Result<Option<u32>> {
        Ok(self.lookup_user(name)?.map(|user| user.uid))
    }

    fn group_id(&self, name: &str) -> Result<Option<u32>> {
        Self::getent("group", name)?
            .map(|line| parse_group_line(&line))
            .transpose()
    }
}

impl IdentityManager for SystemIdentity {
    fn lookup_user(&self, name: &str) -> Result<Option<UserEntry>> {
        Self::getent("passwd", name)?
            .map(|line| parse_passwd_line(&line))
            .transpose()
    }

    fn create_group(&self, name: &str) -> Result<()> {
        runner::run_checked("groupadd", &["--system", name])
    }

    fn create_user(&self, account: &ServiceAccount<'_>) -> Result<()> {
        let home = account.home.to_string_lossy();
        runner::run_checked(
            "useradd",
            &[
                "--system",
                "--gid",
                account.group,
                "--home-dir",
                &home,
                "--no-create-home",
                "--shell",
                NOLOGIN_SHELL,
                "--comment",
                "netkeep service account",
                account.user,
            ],
        )
    }
}

/// Parse `name:x:uid:gid:gecos:home:shell`
pub fn parse_passwd_line(line: &str) -> Result<UserEntry> {
    let fields: Vec<&str> = line.trim_end().split(':').collect();
    if fields.len() != 7 {
        bail!("Malformed passwd entry: {line}");
    }

    Ok(UserEntry {
        name: fields[0].to_string(),
        uid: fields[2]
            .parse()
            .with_context(|| format!("Invalid uid in passwd entry: {line}"))?,
        gid: fields[3]
            .parse()
            .with_context(|| format!("Invalid gid in passwd entry: {line}"))?,
        home: PathBuf::from(fields[5]),
        shell: fields[6].to_string(),
    })
}

/// Parse `name:x:gid:members` and return the gid
pub fn parse_group_line(line: &str) -> Result<u32> {
    let fields: Vec<&str> = line.trim_end().split(':').collect();
    if fields.len() != 4 {
        bail!("Malformed group entry: {line}");
    }
    fields[2]
        .parse()
        .with_context(|| format!("Invalid gid in group entry: {line}"))
}
