//! # Declarative
//!
//! Idempotent reconciliation of filesystem resources.
//!
//! A [`ResourceSpec`] declares what a path should be: a directory or a file,
//! its owner, group and permission bits, and whether its content is
//! protected. The [`Reconciler`] brings the filesystem into agreement with
//! the declaration and reports what it did as a [`ReconcileOutcome`].
//!
//! ## Core Concepts
//!
//! - **ResourceSpec**: desired state of one path
//! - **Reconciler**: create-if-absent, correct-if-drifted, and (only when
//!   asked for an unprotected file) back up and overwrite
//! - **Drift**: a read-only comparison used to verify a finished run
//! - **Principals**: name-to-id lookup supplied by the caller
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{Reconciler, ResourceSpec, Action};
//!
//! let reconciler = Reconciler::new(&principals);
//! let spec = ResourceSpec::file("/etc/netkeep/credentials", "netkeep", "netkeep", 0o600)
//!     .protected();
//!
//! let outcome = reconciler.reconcile(&spec, template_bytes, false)?;
//! if outcome.action == Action::Created {
//!     println!("seeded {}", outcome.target.display());
//! }
//! ```
//!
//! Existing content is never inspected. A rerun with the same specs only
//! ever yields `Preserved` or `PermissionsCorrected`.

pub mod context;
pub mod diff;
pub mod error;
pub mod reconciler;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{Principals, resolve_desired};
pub use diff::{Drift, detect_all, detect_drift};
pub use error::{Call, OperationError};
pub use reconciler::{BACKUP_TIMESTAMP_FORMAT, Reconciler, backup_path};
pub use resource::ResourceSpec;
pub use types::{Action, OutcomeSummary, OwnerGroupMode, ReconcileOutcome, ResourceKind};
