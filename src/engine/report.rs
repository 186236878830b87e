//! Outcome announcements and the end-of-run summary

use colored::{ColoredString, Colorize};
use declarative::{Action, ReconcileOutcome};

use super::journal::RunReport;
use crate::config::ConfigSet;
use crate::paths::{GroupLayout, INVENTORY_FILE};
use crate::ui;

/// One-character marker for an action
pub fn marker(action: Action) -> &'static str {
    match action {
        Action::Created => "+",
        Action::Preserved => "=",
        Action::PermissionsCorrected => "~",
        Action::BackedUpAndOverwritten => "!",
        Action::SkippedInvalidName => "-",
    }
}

fn symbol(action: Action) -> ColoredString {
    let marker = marker(action);
    match action {
        Action::Created => marker.green(),
        Action::Preserved => marker.dimmed(),
        Action::PermissionsCorrected => marker.yellow(),
        Action::BackedUpAndOverwritten => marker.magenta(),
        Action::SkippedInvalidName => marker.red(),
    }
}

/// Extra context shown after the action label
pub fn detail(outcome: &ReconcileOutcome) -> String {
    match (&outcome.prior, &outcome.backup) {
        (_, Some(backup)) => format!("(previous content at {})", backup.display()),
        (Some(prior), None) => format!("(was {prior})"),
        (None, None) => String::new(),
    }
}

/// Print one outcome line
pub fn announce(outcome: &ReconcileOutcome) {
    println!(
        "  {} {:<26} {} {}",
        symbol(outcome.action),
        outcome.action.label(),
        outcome.target.display(),
        detail(outcome).dimmed()
    );
}

/// Print counts, warnings and what the operator should do next
pub fn print_summary(report: &RunReport) {
    let summary = report.summary();

    ui::header("Summary");
    ui::kv("reached", report.stage.label());
    ui::kv("resources", &summary.total().to_string());
    ui::kv("created", &summary.created.to_string());
    ui::kv("preserved", &summary.preserved.to_string());
    ui::kv("corrected", &summary.corrected.to_string());
    ui::kv("backed up", &summary.backed_up.to_string());
    ui::kv("skipped", &summary.skipped.to_string());

    if !report.warnings.is_empty() {
        ui::section(&format!("Warnings ({})", report.warnings.len()));
        for warning in &report.warnings {
            ui::warn(&format!("[{}] {}", warning.stage.label(), warning.message));
        }
    }

    let steps = next_steps(&report.config, &report.outcomes);
    if !steps.is_empty() {
        ui::section("Next steps");
        for step in &steps {
            ui::dim(&format!("• {step}"));
        }
    }

    println!();
    if summary.total_changes() == 0 {
        ui::success("Host already provisioned; nothing changed");
    } else {
        ui::success(&format!(
            "Provisioning complete ({} change{})",
            summary.total_changes(),
            if summary.total_changes() == 1 { "" } else { "s" }
        ));
    }
}

/// Reminders for the operator, derived from what was provisioned
pub fn next_steps(config: &ConfigSet, outcomes: &[ReconcileOutcome]) -> Vec<String> {
    let mut steps = Vec::new();

    let inventories: Vec<String> = config
        .groups
        .iter()
        .map(|name| GroupLayout::new(&config.base_dir, name).inventory())
        .filter(|path| outcomes.iter().any(|o| &o.target == path))
        .map(|path| path.display().to_string())
        .collect();
    if !inventories.is_empty() {
        steps.push(format!(
            "Add devices to each group's {INVENTORY_FILE}: {}",
            inventories.join(", ")
        ));
    }

    steps.push(format!(
        "Fill in device credentials in {}",
        config.credentials_file().display()
    ));

    if outcomes.iter().any(|o| o.action == Action::SkippedInvalidName) {
        steps.push(
            "Rename skipped groups to letters, digits, '-' or '_' and run again".to_string(),
        );
    }

    steps
}
