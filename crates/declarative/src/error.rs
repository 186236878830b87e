//! Operation errors raised by the reconciler.
//!
//! Every failed filesystem mutation is fatal to a run. The error names the
//! call that failed and the path it targeted so the operator can finish the
//! job by hand or rerun once the cause is fixed.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The filesystem call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Stat,
    Read,
    Mkdir,
    Write,
    Chown,
    Chmod,
    Rename,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stat => "stat",
            Self::Read => "read",
            Self::Mkdir => "mkdir",
            Self::Write => "write",
            Self::Chown => "chown",
            Self::Chmod => "chmod",
            Self::Rename => "rename",
        };
        f.write_str(name)
    }
}

/// A fatal failure while reconciling a resource
#[derive(Debug, Error)]
pub enum OperationError {
    /// A filesystem call returned an error
    #[error("{call} failed for {}: {source}", .path.display())]
    Io {
        call: Call,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Owner or group name does not exist on this host
    #[error("cannot apply ownership to {}: {kind} '{name}' does not exist", .path.display())]
    UnknownPrincipal {
        kind: &'static str,
        name: String,
        path: PathBuf,
    },

    /// The account database could not be queried
    #[error("failed to look up '{name}': {message}")]
    Lookup { name: String, message: String },

    /// Path exists but is the wrong kind of object
    #[error("{} exists but is not a {expected}", .path.display())]
    KindMismatch { path: PathBuf, expected: String },
}

impl OperationError {
    pub fn io(call: Call, path: &Path, source: io::Error) -> Self {
        Self::Io {
            call,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn unknown_principal(kind: &'static str, name: &str, path: &Path) -> Self {
        Self::UnknownPrincipal {
            kind,
            name: name.to_string(),
            path: path.to_path_buf(),
        }
    }

    pub fn lookup(name: &str, err: &anyhow::Error) -> Self {
        Self::Lookup {
            name: name.to_string(),
            message: format!("{err:#}"),
        }
    }
}
