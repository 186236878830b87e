//! Run journal - the audit trail of one run
//!
//! Every outcome is announced as it is recorded. Specs recorded here are
//! re-inspected by the final verification stage.

use declarative::{OutcomeSummary, ReconcileOutcome, ResourceSpec};

use super::orchestrator::Stage;
use super::report;
use crate::config::ConfigSet;
use crate::ui;

/// A non-fatal problem noticed during a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug)]
pub struct Journal {
    stage: Stage,
    outcomes: Vec<ReconcileOutcome>,
    warnings: Vec<Warning>,
    tracked: Vec<ResourceSpec>,
    echo: bool,
}

impl Journal {
    /// `echo` controls terminal announcements; log records are always emitted
    pub fn new(echo: bool) -> Self {
        Self {
            stage: Stage::Init,
            outcomes: Vec::new(),
            warnings: Vec::new(),
            tracked: Vec::new(),
            echo,
        }
    }

    /// Start working toward `stage`
    pub fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        log::info!("Entering stage: {}", stage.label());
        if self.echo {
            ui::step(stage.ordinal(), Stage::Done.ordinal() - 1, stage.description());
        }
    }

    /// Record an outcome and keep its spec for verification
    pub fn record(&mut self, spec: &ResourceSpec, outcome: ReconcileOutcome) {
        self.tracked.push(spec.clone());
        self.record_untracked(outcome);
    }

    /// Record an outcome whose resource is not re-verified at the end
    pub fn record_untracked(&mut self, outcome: ReconcileOutcome) {
        if outcome.action.is_change() {
            log::info!("{}: {}", outcome.target.display(), outcome.action);
        } else {
            log::debug!("{}: {}", outcome.target.display(), outcome.action);
        }
        if self.echo {
            report::announce(&outcome);
        }
        self.outcomes.push(outcome);
    }

    /// Announce an action that is not a filesystem outcome
    pub fn note(&mut self, message: &str) {
        log::info!("{message}");
        if self.echo {
            ui::dim(message);
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        if self.echo {
            ui::warn(&message);
        }
        self.warnings.push(Warning {
            stage: self.stage,
            message,
        });
    }

    pub fn tracked(&self) -> &[ResourceSpec] {
        &self.tracked
    }

    pub fn into_report(self, config: ConfigSet, stage: Stage) -> RunReport {
        RunReport {
            config,
            stage,
            outcomes: self.outcomes,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
impl Journal {
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn outcomes(&self) -> &[ReconcileOutcome] {
        &self.outcomes
    }
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunReport {
    pub config: ConfigSet,
    pub stage: Stage,
    pub outcomes: Vec<ReconcileOutcome>,
    pub warnings: Vec<Warning>,
}

impl RunReport {
    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary::from_outcomes(&self.outcomes)
    }
}

#[cfg(test)]
impl RunReport {
    pub fn outcome_for(&self, target: &std::path::Path) -> Option<&ReconcileOutcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }
}
