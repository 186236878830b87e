mod cli;
mod config;
mod engine;
mod error;
mod identity;
mod paths;
mod preflight;
mod provision;
mod runner;
mod sudo;
#[cfg(test)]
mod testing;
mod ui;
mod vcs;

use clap::Parser;
use cli::Cli;
use config::ConfigSources;
use engine::{Orchestrator, RunOptions, RunReport};
use error::{EXIT_OK, ProvisionError};
use identity::SystemIdentity;
use std::path::Path;
use std::process::ExitCode;
use vcs::GitClient;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(report) => {
            if !cli.quiet {
                engine::report::print_summary(&report);
            }
            ExitCode::from(EXIT_OK)
        }
        Err(err) => {
            ui::error(&err.to_string());
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<RunReport, ProvisionError> {
    let sources = sources(cli)?;
    preflight::ensure_root()?;
    preflight::check_dependencies(preflight::REQUIRED_TOOLS)?;

    if !cli.quiet {
        ui::header("netkeep provisioning");
        ui::kv("record", &sources.record_path.display().to_string());
        ui::kv("templates", &sources.template_dir.display().to_string());
        if cli.force {
            ui::warn("--force: non-protected files will be backed up and rewritten");
        }
    }

    let identity = SystemIdentity::new();
    let vcs = GitClient::new(true);
    let options = RunOptions {
        force: cli.force,
        echo: !cli.quiet,
    };

    let mut orchestrator = Orchestrator::new(&identity, &vcs, options);
    let result = orchestrator.run(&sources);
    if result.is_err() {
        let stage = orchestrator.stage().label();
        log::error!("Run halted after stage {stage}");
        ui::dim(&format!("Halted after stage: {stage}"));
    }
    result
}

/// Turn command-line paths into configuration sources
///
/// An override file named explicitly must exist; the default one is optional.
fn sources(cli: &Cli) -> Result<ConfigSources, ProvisionError> {
    let usage = |e: anyhow::Error| ProvisionError::Usage(format!("{e:#}"));

    let env_file = match &cli.env_file {
        Some(path) if !path.is_file() => {
            return Err(ProvisionError::Usage(format!(
                "override file {} does not exist",
                path.display()
            )));
        }
        Some(path) => paths::absolute(path).map_err(usage)?,
        None => paths::absolute(Path::new(paths::DEFAULT_ENV_FILE)).map_err(usage)?,
    };

    let template_dir = match &cli.templates {
        Some(dir) => paths::absolute(dir).map_err(usage)?,
        None => paths::default_template_dir().map_err(usage)?,
    };

    Ok(ConfigSources {
        env_file: Some(env_file),
        record_path: paths::absolute(&cli.config).map_err(usage)?,
        template_dir,
    })
}
