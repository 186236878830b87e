//! Top-level directories

use declarative::ResourceSpec;

use super::StepContext;
use crate::config::{ConfigSet, ROOT_ACCOUNT};
use crate::engine::Journal;
use crate::error::ProvisionError;

/// Mode of the base and etc directories
pub const TOP_DIR_MODE: u32 = 0o750;

/// Base directory owned by the service account, etc directory owned by
/// root but readable by the service group
pub fn top_level_specs(config: &ConfigSet) -> [ResourceSpec; 2] {
    [
        ResourceSpec::directory(
            &config.base_dir,
            &config.service_user,
            &config.service_group,
            TOP_DIR_MODE,
        ),
        ResourceSpec::directory(
            &config.etc_dir,
            ROOT_ACCOUNT,
            &config.service_group,
            TOP_DIR_MODE,
        ),
    ]
}

pub fn ensure_directories(ctx: &StepContext<'_>, journal: &mut Journal) -> Result<(), ProvisionError> {
    for spec in top_level_specs(ctx.config) {
        ctx.ensure(journal, &spec, &[], ctx.force)?;
    }
    Ok(())
}
