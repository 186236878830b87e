//! Run-level error taxonomy
//!
//! Everything below the orchestrator either returns a typed outcome or one of
//! these errors. Soft warnings are not errors; they travel in the run journal.

use declarative::OperationError;
use thiserror::Error;

/// Exit code for a successful run
pub const EXIT_OK: u8 = 0;
/// Exit code for operation and validation failures
pub const EXIT_FAILURE: u8 = 1;
/// Exit code for invalid invocation
pub const EXIT_USAGE: u8 = 2;
/// Exit code for a missing external tool
pub const EXIT_DEPENDENCY: u8 = 3;

/// A fatal error that ends the run
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Bad invocation; nothing was touched
    #[error("invalid usage: {0}")]
    Usage(String),

    /// The process lacks the privileges a run needs; nothing was touched
    #[error("insufficient privileges: {0}")]
    Privilege(String),

    /// Required external tools are not installed; nothing was touched
    #[error("missing required tools: {}", .missing.join(", "))]
    Dependency { missing: Vec<String> },

    /// Configuration is malformed or incomplete, or a finished run failed verification
    #[error("invalid configuration: {}", .problems.join("; "))]
    Validation { problems: Vec<String> },

    /// A filesystem mutation failed
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// An external tool needed to make a change failed
    #[error("{action} failed: {source:#}")]
    External {
        action: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ProvisionError {
    pub fn validation(problem: impl Into<String>) -> Self {
        Self::Validation {
            problems: vec![problem.into()],
        }
    }

    pub fn external(action: impl Into<String>, source: anyhow::Error) -> Self {
        Self::External {
            action: action.into(),
            source,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Dependency { .. } => EXIT_DEPENDENCY,
            Self::Privilege(_)
            | Self::Validation { .. }
            | Self::Operation(_)
            | Self::External { .. } => EXIT_FAILURE,
        }
    }
}
