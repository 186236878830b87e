//! Impersonated command execution
//!
//! Commands that create state the service identity must own (repositories)
//! run as that identity through `sudo -u <user> -H`, so nothing it later
//! writes into ends up owned by root.

use anyhow::{Context, Result};
use std::process::Command;

use crate::runner;

/// Runs commands either as the invoking user or as a named account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAs {
    user: Option<String>,
}

impl RunAs {
    /// Run commands as the invoking user
    pub fn invoker() -> Self {
        Self { user: None }
    }

    /// Run commands as `user` via sudo
    pub fn user(user: &str) -> Self {
        Self {
            user: Some(user.to_string()),
        }
    }

    /// Program and arguments that will actually be executed
    pub fn argv(&self, cmd: &str, args: &[&str]) -> (String, Vec<String>) {
        match &self.user {
            None => (
                cmd.to_string(),
                args.iter().map(|a| (*a).to_string()).collect(),
            ),
            Some(user) => {
                let mut argv = vec![
                    "-u".to_string(),
                    user.clone(),
                    "-H".to_string(),
                    "--".to_string(),
                    cmd.to_string(),
                ];
                argv.extend(args.iter().map(|a| (*a).to_string()));
                ("sudo".to_string(), argv)
            }
        }
    }

    /// Run a command and capture output
    pub fn run_capture(&self, cmd: &str, args: &[&str]) -> Result<String> {
        let (program, argv) = self.argv(cmd, args);
        log::debug!("Running: {} {}", program, argv.join(" "));

        let output = Command::new(&program)
            .args(&argv)
            .output()
            .with_context(|| format!("Failed to execute: {} {}", program, argv.join(" ")))?;

        runner::check_output(cmd, &output)
    }

    /// Run a command for its side effect, failing on non-zero exit
    pub fn run_checked(&self, cmd: &str, args: &[&str]) -> Result<()> {
        self.run_capture(cmd, args).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoker_argv_is_unchanged() {
        let (program, argv) = RunAs::invoker().argv("git", &["init", "-q"]);
        assert_eq!(program, "git");
        assert_eq!(argv, vec!["init", "-q"]);
    }

    #[test]
    fn test_user_argv_goes_through_sudo() {
        let (program, argv) = RunAs::user("netkeep").argv("git", &["-C", "/srv", "init"]);
        assert_eq!(program, "sudo");
        assert_eq!(
            argv,
            vec!["-u", "netkeep", "-H", "--", "git", "-C", "/srv", "init"]
        );
    }

    #[test]
    fn test_invoker_runs_directly() {
        assert_eq!(
            RunAs::invoker().run_capture("echo", &["ok"]).unwrap(),
            "ok"
        );
    }
}
