//! Checks that run before anything is touched

use crate::error::ProvisionError;
use crate::runner;

/// External tools a run may invoke
pub const REQUIRED_TOOLS: &[&str] = &["git", "getent", "groupadd", "useradd", "sudo"];

/// Tools from `tools` that `exists` does not find, in the given order
pub fn missing_tools(tools: &[&str], exists: impl Fn(&str) -> bool) -> Vec<String> {
    tools
        .iter()
        .filter(|tool| !exists(**tool))
        .map(|tool| (*tool).to_string())
        .collect()
}

pub fn check_dependencies(tools: &[&str]) -> Result<(), ProvisionError> {
    let missing = missing_tools(tools, runner::command_exists);
    if missing.is_empty() {
        log::debug!("All required tools found: {}", tools.join(", "));
        Ok(())
    } else {
        Err(ProvisionError::Dependency { missing })
    }
}

/// Account and ownership changes need root
pub fn ensure_root() -> Result<(), ProvisionError> {
    #[allow(unsafe_code)]
    // SAFETY: geteuid has no preconditions and cannot fail
    let euid = unsafe { libc::geteuid() };
    if euid == 0 {
        Ok(())
    } else {
        Err(ProvisionError::Privilege(format!(
            "must run as root (effective uid is {euid})"
        )))
    }
}
