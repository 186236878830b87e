//! Per-group directory trees and inventories

use declarative::{ReconcileOutcome, ResourceSpec};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::{StepContext, read_template};
use crate::engine::Journal;
use crate::error::ProvisionError;
use crate::paths::GroupLayout;

pub const GROUP_DIR_MODE: u32 = 0o750;
pub const INVENTORY_MODE: u32 = 0o640;

/// Group names become path components, so only a safe subset is accepted
static GROUP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("hardcoded regex pattern is valid")
});

pub fn is_valid_group_name(name: &str) -> bool {
    GROUP_NAME.is_match(name)
}

/// Provision every valid group in configured order
///
/// Invalid names are skipped with a warning and never touch the filesystem.
/// Returns the layouts that were provisioned.
pub fn provision_groups(
    ctx: &StepContext<'_>,
    journal: &mut Journal,
) -> Result<Vec<GroupLayout>, ProvisionError> {
    let template = read_template(&ctx.config.inventory_template())?;
    let user = ctx.config.service_user.as_str();
    let group = ctx.config.service_group.as_str();
    let mut provisioned = Vec::new();

    for name in &ctx.config.groups {
        if !is_valid_group_name(name) {
            journal.record_untracked(ReconcileOutcome::skipped_invalid(PathBuf::from(name)));
            journal.warn(format!(
                "Skipping group '{name}': names may only contain letters, digits, '-' and '_'"
            ));
            continue;
        }

        let layout = GroupLayout::new(&ctx.config.base_dir, name);
        for dir in std::iter::once(layout.root.clone()).chain(layout.subdirectories()) {
            let spec = ResourceSpec::directory(dir, user, group, GROUP_DIR_MODE);
            ctx.ensure(journal, &spec, &[], ctx.force)?;
        }

        // Inventories hold operator data and are never overwritten
        let inventory =
            ResourceSpec::file(layout.inventory(), user, group, INVENTORY_MODE).protected();
        ctx.ensure(journal, &inventory, &template, false)?;

        provisioned.push(layout);
    }

    Ok(provisioned)
}
