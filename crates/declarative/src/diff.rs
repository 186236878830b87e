//! Drift detection - compare a resource's current state to its spec

use crate::context::{Principals, resolve_desired};
use crate::error::OperationError;
use crate::reconciler::{check_kind, stat};
use crate::resource::ResourceSpec;
use crate::types::OwnerGroupMode;
use std::fmt;
use std::path::PathBuf;

/// A mismatch between a resource and its spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    pub path: PathBuf,
    /// `None` when the resource does not exist at all
    pub current: Option<OwnerGroupMode>,
    pub desired: OwnerGroupMode,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.current {
            None => write!(f, "{}: missing (want {})", self.path.display(), self.desired),
            Some(current) => write!(
                f,
                "{}: {} (want {})",
                self.path.display(),
                current,
                self.desired
            ),
        }
    }
}

/// Inspect a resource without changing anything
///
/// Returns `Ok(None)` when the resource exists with the declared kind,
/// ownership and mode.
pub fn detect_drift(
    principals: &dyn Principals,
    spec: &ResourceSpec,
) -> Result<Option<Drift>, OperationError> {
    let desired = resolve_desired(principals, spec)?;

    let Some(metadata) = stat(&spec.path)? else {
        return Ok(Some(Drift {
            path: spec.path.clone(),
            current: None,
            desired,
        }));
    };

    check_kind(spec, &metadata)?;
    let current = OwnerGroupMode::from_metadata(&metadata);

    Ok((current != desired).then(|| Drift {
        path: spec.path.clone(),
        current: Some(current),
        desired,
    }))
}

/// Inspect every spec, collecting all drift found
pub fn detect_all<'a>(
    principals: &dyn Principals,
    specs: impl IntoIterator<Item = &'a ResourceSpec>,
) -> Result<Vec<Drift>, OperationError> {
    let mut drifts = Vec::new();
    for spec in specs {
        if let Some(drift) = detect_drift(principals, spec)? {
            drifts.push(drift);
        }
    }
    Ok(drifts)
}
