//! Run orchestration
//!
//! A run moves through a fixed sequence of stages. Each stage must finish
//! before the next begins; the first fatal error halts the machine at the
//! last completed stage and nothing later is attempted.

use declarative::{Principals, Reconciler, detect_all};

use super::journal::{Journal, RunReport};
use crate::config::{self, ConfigSources};
use crate::error::ProvisionError;
use crate::identity::IdentityManager;
use crate::provision::{
    StepContext, credentials, directories, groups, identity, repositories, schedule,
};
use crate::vcs::VersionControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    ConfigLoaded,
    IdentityEnsured,
    DirectoriesEnsured,
    GroupsProvisioned,
    CredentialStoreEnsured,
    VersionControlEnsured,
    ScheduleEnsured,
    Validated,
    Done,
}

impl Stage {
    pub const ALL: [Self; 10] = [
        Self::Init,
        Self::ConfigLoaded,
        Self::IdentityEnsured,
        Self::DirectoriesEnsured,
        Self::GroupsProvisioned,
        Self::CredentialStoreEnsured,
        Self::VersionControlEnsured,
        Self::ScheduleEnsured,
        Self::Validated,
        Self::Done,
    ];

    /// Position in the sequence, `Init` being 0
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.ordinal() + 1).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ConfigLoaded => "config-loaded",
            Self::IdentityEnsured => "identity-ensured",
            Self::DirectoriesEnsured => "directories-ensured",
            Self::GroupsProvisioned => "groups-provisioned",
            Self::CredentialStoreEnsured => "credential-store-ensured",
            Self::VersionControlEnsured => "version-control-ensured",
            Self::ScheduleEnsured => "schedule-ensured",
            Self::Validated => "validated",
            Self::Done => "done",
        }
    }

    /// What the run does to reach this stage
    pub fn description(self) -> &'static str {
        match self {
            Self::Init => "Starting",
            Self::ConfigLoaded => "Loading configuration",
            Self::IdentityEnsured => "Ensuring service account",
            Self::DirectoriesEnsured => "Ensuring directories",
            Self::GroupsProvisioned => "Provisioning groups",
            Self::CredentialStoreEnsured => "Ensuring credential store",
            Self::VersionControlEnsured => "Ensuring repositories",
            Self::ScheduleEnsured => "Ensuring schedule",
            Self::Validated => "Verifying",
            Self::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub force: bool,
    /// Announce progress on the terminal
    pub echo: bool,
}

pub struct Orchestrator<'a> {
    identity: &'a dyn IdentityManager,
    vcs: &'a dyn VersionControl,
    options: RunOptions,
    stage: Stage,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        identity: &'a dyn IdentityManager,
        vcs: &'a dyn VersionControl,
        options: RunOptions,
    ) -> Self {
        Self {
            identity,
            vcs,
            options,
            stage: Stage::Init,
        }
    }

    /// Last stage that completed
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, to: Stage) {
        debug_assert_eq!(self.stage.next(), Some(to), "stages must not be skipped");
        log::debug!("Stage {} -> {}", self.stage.label(), to.label());
        self.stage = to;
    }

    pub fn run(&mut self, sources: &ConfigSources) -> Result<RunReport, ProvisionError> {
        let mut journal = Journal::new(self.options.echo);
        let principals: &dyn Principals = self.identity;
        let reconciler = Reconciler::new(principals);

        journal.enter(Stage::ConfigLoaded);
        let resolution = config::resolve(sources)?;
        for warning in resolution.warnings {
            journal.warn(warning);
        }
        let config = resolution.config;
        log::debug!("Resolved configuration: {config:?}");
        if resolution.record_present {
            journal.note(&format!(
                "Using configuration record {}",
                sources.record_path.display()
            ));
        } else {
            for outcome in config::persist_record(&config, &sources.record_path, &reconciler)? {
                journal.record_untracked(outcome);
            }
        }
        self.advance(Stage::ConfigLoaded);

        journal.enter(Stage::IdentityEnsured);
        identity::ensure_identity(&config, self.identity, &mut journal)?;
        self.advance(Stage::IdentityEnsured);

        let ctx = StepContext {
            config: &config,
            reconciler: &reconciler,
            force: self.options.force,
        };

        journal.enter(Stage::DirectoriesEnsured);
        directories::ensure_directories(&ctx, &mut journal)?;
        self.advance(Stage::DirectoriesEnsured);

        journal.enter(Stage::GroupsProvisioned);
        let layouts = groups::provision_groups(&ctx, &mut journal)?;
        self.advance(Stage::GroupsProvisioned);

        journal.enter(Stage::CredentialStoreEnsured);
        credentials::ensure_credentials(&ctx, &mut journal)?;
        self.advance(Stage::CredentialStoreEnsured);

        journal.enter(Stage::VersionControlEnsured);
        repositories::ensure_repositories(&config, &layouts, self.vcs, &mut journal)?;
        self.advance(Stage::VersionControlEnsured);

        journal.enter(Stage::ScheduleEnsured);
        schedule::ensure_schedule(&ctx, &mut journal)?;
        self.advance(Stage::ScheduleEnsured);

        journal.enter(Stage::Validated);
        verify(principals, &journal)?;
        self.advance(Stage::Validated);

        self.advance(Stage::Done);
        Ok(journal.into_report(config, self.stage))
    }
}

/// Re-inspect every managed resource; any remaining drift fails the run
fn verify(principals: &dyn Principals, journal: &Journal) -> Result<(), ProvisionError> {
    let drifts = detect_all(principals, journal.tracked())?;
    if drifts.is_empty() {
        log::info!("Verified {} resources", journal.tracked().len());
        return Ok(());
    }
    Err(ProvisionError::Validation {
        problems: drifts
            .iter()
            .map(|drift| format!("drift remains at {drift}"))
            .collect(),
    })
}
