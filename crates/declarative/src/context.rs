//! Provider traits
//!
//! The reconciler never looks up users or groups itself. Callers supply a
//! [`Principals`] implementation, which keeps the engine testable without
//! touching the host's account databases.

use crate::error::OperationError;
use crate::resource::ResourceSpec;
use crate::types::OwnerGroupMode;
use anyhow::Result;

/// Resolves account names to numeric ids
pub trait Principals {
    /// Numeric uid for a user name, or `None` if no such user exists
    fn user_id(&self, name: &str) -> Result<Option<u32>>;

    /// Numeric gid for a group name, or `None` if no such group exists
    fn group_id(&self, name: &str) -> Result<Option<u32>>;
}

/// Resolve a spec's owner/group names into the numeric triple it demands
pub fn resolve_desired(
    principals: &dyn Principals,
    spec: &ResourceSpec,
) -> Result<OwnerGroupMode, OperationError> {
    let uid = principals
        .user_id(&spec.owner)
        .map_err(|e| OperationError::lookup(&spec.owner, &e))?
        .ok_or_else(|| OperationError::unknown_principal("user", &spec.owner, &spec.path))?;

    let gid = principals
        .group_id(&spec.group)
        .map_err(|e| OperationError::lookup(&spec.group, &e))?
        .ok_or_else(|| OperationError::unknown_principal("group", &spec.group, &spec.path))?;

    Ok(OwnerGroupMode::new(uid, gid, spec.mode))
}
