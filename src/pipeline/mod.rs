//! The fetch, build, style-check sequence and its result types.

mod orchestrator;
mod steps;
mod types;

pub use orchestrator::{run, run_and_report};
pub use steps::{Builder, Fetcher, StyleCheck, Steps};
pub use types::{Disposition, Findings, RunSummary, Stage, StepResult, StepStatus};
