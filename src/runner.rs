use anyhow::{Context, Result};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

/// Run a command and capture output
pub fn run_capture(cmd: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(cmd)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))?;

    check_output(cmd, &output)
}

/// Turn a finished command into its trimmed stdout, or an error carrying stderr
pub fn check_output(cmd: &str, output: &Output) -> Result<String> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} failed ({}): {}", cmd, output.status, stderr.trim())
    }
}

/// Run a command for its side effect, failing on non-zero exit
pub fn run_checked(cmd: &str, args: &[&str]) -> Result<()> {
    log::debug!("Running: {} {}", cmd, args.join(" "));
    run_capture(cmd, args).map(|_| ())
}

/// Check if an executable named `cmd` is on `PATH`
pub fn command_exists(cmd: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| is_executable(&dir.join(cmd)))
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_capture_trims_stdout() {
        assert_eq!(run_capture("echo", &["  hello "]).unwrap(), "hello");
    }

    #[test]
    fn test_failing_command_reports_stderr() {
        let err = run_capture("sh", &["-c", "echo nope >&2; exit 3"]).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_missing_command_does_not_exist() {
        assert!(!command_exists("netkeep-no-such-tool"));
    }

    #[test]
    fn test_executable_bit_required() {
        let tmp = tempfile::TempDir::new().unwrap();
        let tool = tmp.path().join("tool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        assert!(!is_executable(&tool));

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_executable(&tool));
        assert!(!is_executable(tmp.path()));
    }
}
