use crate::config::{CheckConfig, RunMeta};
use crate::error::{CheckError, Result};
use crate::fetch::FetchRequest;
use crate::report::{self, ReportArtifacts};
use crate::workspace::WorkspaceLock;

use super::steps::{Builder, Fetcher, StyleCheck, Steps};
use super::types::{RunSummary, Stage, StepResult};

impl Stage {
    /// Next state from `self` given the build outcome. `Building` and
    /// `Linting` are where the steps run; `build_ok` is only read on
    /// leaving `Building`.
    pub fn next(self, build_ok: bool, fail_on_issues: bool) -> Stage {
        match self {
            Stage::Start => Stage::Building,
            Stage::Building if build_ok => Stage::Passed,
            Stage::Building => Stage::Failed,
            Stage::Passed => Stage::Linting,
            Stage::Failed if fail_on_issues => Stage::Done,
            Stage::Failed => Stage::Linting,
            Stage::Linting => Stage::Linted,
            Stage::Linted | Stage::Done => Stage::Done,
        }
    }
}

/// Fetch, build, then style-check per the fail-fast policy.
///
/// Build and style findings are returned as data inside the summary. Only
/// infrastructure problems (lock, fetch, missing or crashing tools) are
/// errors; a fetch error stops the run before the build.
pub fn run<F, B, S>(cfg: &CheckConfig, steps: &Steps<F, B, S>) -> Result<RunSummary>
where
    F: Fetcher,
    B: Builder,
    S: StyleCheck,
{
    let _lock = WorkspaceLock::acquire(&cfg.workspace)?;

    tracing::info!("Starting quality check for {}", cfg.project_id);
    let workspace = steps.fetcher.fetch(&FetchRequest::from_config(cfg))?;

    let mut stage = Stage::Start;
    let mut build: Option<StepResult> = None;
    let mut lint: Option<StepResult> = None;

    while stage != Stage::Done {
        match stage {
            Stage::Building => {
                tracing::info!("Checking if the project builds...");
                build = Some(steps.builder.build(&workspace)?);
            }
            Stage::Failed if cfg.fail_on_issues => {
                tracing::info!("Build failed and fail_on_issues is set. Skipping Checkstyle.");
            }
            Stage::Failed => {
                tracing::info!("Build failed but fail_on_issues is not set. Continuing with Checkstyle.");
            }
            Stage::Linting => {
                tracing::info!("Running Checkstyle...");
                lint = Some(steps.style.check(&workspace, cfg.style_config.as_deref())?);
            }
            Stage::Start | Stage::Passed | Stage::Linted | Stage::Done => {}
        }

        let build_ok = build.as_ref().is_some_and(StepResult::is_success);
        let next = stage.next(build_ok, cfg.fail_on_issues);
        tracing::debug!("{stage:?} -> {next:?}");
        stage = next;
    }

    let build = build.ok_or_else(|| CheckError::ToolFailed {
        tool: "javac".into(),
        reason: "the build step never ran".into(),
    })?;
    let summary = RunSummary::new(RunMeta::from(cfg), build, lint);
    tracing::info!("{}", summary.headline());
    Ok(summary)
}

/// [`run`], then persist the summary and logs into `cfg.results_dir`.
pub fn run_and_report<F, B, S>(
    cfg: &CheckConfig,
    steps: &Steps<F, B, S>,
) -> Result<(RunSummary, ReportArtifacts)>
where
    F: Fetcher,
    B: Builder,
    S: StyleCheck,
{
    let summary = run(cfg, steps)?;
    let artifacts = report::write_report(&cfg.results_dir, &summary)?;
    Ok((summary, artifacts))
}
