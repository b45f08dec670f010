use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::build::CompileError;
use crate::config::RunMeta;
use crate::style::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Failure,
    Skipped,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Success => "success",
            StepStatus::Failure => "failure",
            StepStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured findings of a step. The style step fills `violations` and
/// `unparsed`; the build step fills `compile_errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub issue_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compile_errors: Vec<CompileError>,
    /// Sources Checkstyle could not parse. They are reported but not
    /// counted as issues.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unparsed: Vec<PathBuf>,
}

/// Outcome of one pipeline step. Created once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub status: StepStatus,
    pub message: String,
    pub log_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<Findings>,
}

impl StepResult {
    pub fn success(message: impl Into<String>, log_path: Option<PathBuf>) -> Self {
        Self {
            status: StepStatus::Success,
            message: message.into(),
            log_path,
            findings: None,
        }
    }

    pub fn failure(message: impl Into<String>, log_path: Option<PathBuf>) -> Self {
        Self {
            status: StepStatus::Failure,
            message: message.into(),
            log_path,
            findings: None,
        }
    }

    /// A style result whose status follows from the findings: any issue or
    /// unparsed source makes it a failure.
    pub fn from_findings(message: impl Into<String>, log_path: Option<PathBuf>, findings: Findings) -> Self {
        let status = if findings.issue_count == 0 && findings.unparsed.is_empty() {
            StepStatus::Success
        } else {
            StepStatus::Failure
        };
        Self {
            status,
            message: message.into(),
            log_path,
            findings: Some(findings),
        }
    }

    /// Attach findings without changing the status.
    pub fn with_findings(mut self, findings: Findings) -> Self {
        self.findings = Some(findings);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }

    pub fn issue_count(&self) -> usize {
        self.findings.as_ref().map_or(0, |f| f.issue_count)
    }
}

/// Final verdict of a run, distinct from the individual step statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Passed,
    Failed,
}

impl Disposition {
    /// A run fails only when `fail_on_issues` is set and the build failed or
    /// the style check reported at least one issue.
    pub fn decide(fail_on_issues: bool, build: &StepResult, lint: Option<&StepResult>) -> Self {
        let build_failed = !build.is_success();
        let lint_issues = lint.is_some_and(|l| l.issue_count() > 0 || !l.is_success());
        if fail_on_issues && (build_failed || lint_issues) {
            Disposition::Failed
        } else {
            Disposition::Passed
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Disposition::Passed => 0,
            Disposition::Failed => crate::error::EXIT_GATE_FAILED,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Passed => "passed",
            Disposition::Failed => "failed",
        }
    }
}

/// Orchestrator states, in the order a run moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Building,
    Passed,
    Failed,
    Linting,
    Linted,
    Done,
}

/// Aggregate of one run. Finalized once, then only read and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub timestamp: DateTime<Local>,
    pub meta: RunMeta,
    pub build: StepResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint: Option<StepResult>,
    pub lint_status: StepStatus,
    pub lint_issue_count: usize,
    pub disposition: Disposition,
}

impl RunSummary {
    pub fn new(meta: RunMeta, build: StepResult, lint: Option<StepResult>) -> Self {
        let disposition = Disposition::decide(meta.fail_on_issues, &build, lint.as_ref());
        Self {
            timestamp: Local::now(),
            lint_status: lint.as_ref().map_or(StepStatus::Skipped, |l| l.status),
            lint_issue_count: lint.as_ref().map_or(0, StepResult::issue_count),
            meta,
            build,
            lint,
            disposition,
        }
    }

    pub fn lint_status(&self) -> StepStatus {
        self.lint_status
    }

    pub fn exit_code(&self) -> i32 {
        self.disposition.exit_code()
    }

    /// One-line human summary, e.g. `build: failure, lint: failure(3)`.
    pub fn headline(&self) -> String {
        let lint = match &self.lint {
            Some(l) if l.issue_count() > 0 => format!("{}({})", l.status, l.issue_count()),
            Some(l) => l.status.to_string(),
            None => StepStatus::Skipped.to_string(),
        };
        format!(
            "build: {}, lint: {} => {}",
            self.build.status,
            lint,
            self.disposition.as_str()
        )
    }
}
