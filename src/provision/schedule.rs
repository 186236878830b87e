//! Periodic collection schedule

use declarative::ResourceSpec;

use super::StepContext;
use crate::config::ROOT_ACCOUNT;
use crate::engine::Journal;
use crate::error::ProvisionError;

pub const SCHEDULE_MODE: u32 = 0o644;

const SCHEDULE_HEADER: &str =
    "# Managed by netkeep. Local edits are preserved unless --force is used.\n";

/// Content of the schedule file for one schedule line
pub fn render_schedule(line: &str) -> String {
    format!("{SCHEDULE_HEADER}{}\n", line.trim_end())
}

/// Write the schedule file when absent, or back it up and rewrite it under `--force`
pub fn ensure_schedule(ctx: &StepContext<'_>, journal: &mut Journal) -> Result<(), ProvisionError> {
    let spec = ResourceSpec::file(
        &ctx.config.schedule_file,
        ROOT_ACCOUNT,
        ROOT_ACCOUNT,
        SCHEDULE_MODE,
    );
    let content = render_schedule(&ctx.config.schedule_line);
    ctx.ensure(journal, &spec, content.as_bytes(), ctx.force)
}
