//! Provisioning engine
//!
//! The engine drives a run:
//! 1. Orchestrating - move through the stages in order
//! 2. Journaling - record and announce every outcome and warning
//! 3. Reporting - summarize the run for the operator

pub mod journal;
pub mod orchestrator;
pub mod report;

pub use journal::{Journal, RunReport};
pub use orchestrator::{Orchestrator, RunOptions};
