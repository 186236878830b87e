//! Shared credential store

use declarative::ResourceSpec;

use super::{StepContext, read_template};
use crate::engine::Journal;
use crate::error::ProvisionError;

pub const CREDENTIALS_MODE: u32 = 0o600;

/// Seed the credential store from its template once
///
/// The store holds secrets, so it is protected and `--force` never applies.
/// An existing store only has its ownership and mode corrected.
pub fn ensure_credentials(ctx: &StepContext<'_>, journal: &mut Journal) -> Result<(), ProvisionError> {
    let template = read_template(&ctx.config.credentials_template())?;
    let spec = ResourceSpec::file(
        ctx.config.credentials_file(),
        &ctx.config.service_user,
        &ctx.config.service_group,
        CREDENTIALS_MODE,
    )
    .protected();
    ctx.ensure(journal, &spec, &template, false)
}
