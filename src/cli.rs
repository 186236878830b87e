use clap::Parser;
use std::path::PathBuf;

use crate::paths;

#[derive(Parser, Debug)]
#[command(name = "netkeep")]
#[command(author = "netkeep developers")]
#[command(version)]
#[command(about = "Provision a host for network configuration archiving", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Back up and rewrite managed files that are not protected
    #[arg(long)]
    pub force: bool,

    /// Override file with KEY=value settings [default: ./netkeep.env if present]
    #[arg(long, env = paths::ENV_ENV_FILE, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Persisted configuration record
    #[arg(long, env = paths::ENV_CONFIG, value_name = "PATH", default_value = paths::DEFAULT_RECORD_PATH)]
    pub config: PathBuf,

    /// Directory holding inventory.template and credentials.template
    /// [default: templates/ next to the binary]
    #[arg(long, env = paths::ENV_TEMPLATE_DIR, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}
