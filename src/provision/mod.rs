//! Provisioners - one per kind of host state
//!
//! Each provisioner turns the resolved configuration into resource specs,
//! reconciles them and records the outcomes in the run journal.

pub mod credentials;
pub mod directories;
pub mod groups;
pub mod identity;
pub mod repositories;
pub mod schedule;

use declarative::{Call, OperationError, Reconciler, ResourceSpec};
use std::fs;
use std::io;
use std::path::Path;

use crate::config::ConfigSet;
use crate::engine::Journal;
use crate::error::ProvisionError;

/// What every filesystem-backed provisioner needs
pub struct StepContext<'a> {
    pub config: &'a ConfigSet,
    pub reconciler: &'a Reconciler<'a>,
    /// Overwrite existing non-protected files after backing them up
    pub force: bool,
}

impl StepContext<'_> {
    /// Reconcile `spec` and record the outcome for verification
    pub fn ensure(
        &self,
        journal: &mut Journal,
        spec: &ResourceSpec,
        content: &[u8],
        force: bool,
    ) -> Result<(), ProvisionError> {
        let outcome = self.reconciler.reconcile(spec, content, force)?;
        journal.record(spec, outcome);
        Ok(())
    }
}

/// Read a seed template; a missing template is a configuration problem
pub fn read_template(path: &Path) -> Result<Vec<u8>, ProvisionError> {
    match fs::read(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ProvisionError::validation(format!(
            "template {} does not exist",
            path.display()
        ))),
        Err(e) => Err(OperationError::io(Call::Read, path, e).into()),
    }
}
