//! Persists a finished run into the results directory.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::build::BUILD_LOG_FILE;
use crate::error::{CheckError, Result};
use crate::pipeline::{RunSummary, StepResult};
use crate::style::STYLE_LOG_FILE;

pub const SUMMARY_FILE: &str = "summary.json";

/// Findings listed per step in [`render_text`]; the full list is in the log.
const MAX_LISTED_FINDINGS: usize = 20;

/// Paths written by [`write_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub dir: PathBuf,
    pub summary: PathBuf,
    pub build_log: Option<PathBuf>,
    pub style_log: Option<PathBuf>,
}

/// Write `summary.json` and copies of the step logs into `dir`.
///
/// Artifacts of a previous run are removed first, so a skipped lint never
/// leaves an old `checkstyle.log` behind.
pub fn write_report(dir: &Path, summary: &RunSummary) -> Result<ReportArtifacts> {
    let report_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: anyhow::Error| CheckError::Report { path, source }
    };

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create results directory: {}", dir.display()))
        .map_err(report_err(dir))?;

    for stale in [BUILD_LOG_FILE, STYLE_LOG_FILE, SUMMARY_FILE] {
        let path = dir.join(stale);
        remove_if_present(&path).map_err(report_err(&path))?;
    }

    let build_log = copy_log(&summary.build, &dir.join(BUILD_LOG_FILE))
        .map_err(report_err(&dir.join(BUILD_LOG_FILE)))?;
    let style_log = match &summary.lint {
        Some(lint) => copy_log(lint, &dir.join(STYLE_LOG_FILE))
            .map_err(report_err(&dir.join(STYLE_LOG_FILE)))?,
        None => None,
    };

    let summary_path = dir.join(SUMMARY_FILE);
    write_summary(&summary_path, summary).map_err(report_err(&summary_path))?;
    tracing::info!("Quality check report saved to: {}", summary_path.display());

    Ok(ReportArtifacts {
        dir: dir.to_path_buf(),
        summary: summary_path,
        build_log,
        style_log,
    })
}

fn write_summary(path: &Path, summary: &RunSummary) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn copy_log(step: &StepResult, dest: &Path) -> anyhow::Result<Option<PathBuf>> {
    let Some(source) = &step.log_path else {
        return Ok(None);
    };
    if !source.is_file() {
        tracing::warn!("Log file {} does not exist, not copying", source.display());
        return Ok(None);
    }
    fs::copy(source, dest)
        .with_context(|| format!("Failed to copy {} to {}", source.display(), dest.display()))?;
    Ok(Some(dest.to_path_buf()))
}

fn remove_if_present(path: &Path) -> anyhow::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove stale {}", path.display())),
    }
}

/// Human-readable summary for the terminal.
pub fn render_text(summary: &RunSummary) -> String {
    let meta = &summary.meta;
    let mut out = String::new();

    let project = match &meta.project_hw {
        Some(hw) => format!("{}/{}", meta.project_id, hw),
        None => meta.project_id.clone(),
    };
    let _ = writeln!(out, "Quality check for {project} (branch {})", meta.branch);
    let _ = writeln!(out, "  build: {} - {}", summary.build.status, summary.build.message);
    if let Some(findings) = &summary.build.findings {
        list(&mut out, &findings.compile_errors);
    }
    match &summary.lint {
        Some(lint) => {
            let _ = writeln!(out, "  lint:  {} - {}", lint.status, lint.message);
            if let Some(findings) = &lint.findings {
                list(&mut out, &findings.violations);
                for file in &findings.unparsed {
                    let _ = writeln!(out, "    {}: not parsed by Checkstyle", file.display());
                }
            }
        }
        None => {
            let _ = writeln!(out, "  lint:  skipped");
        }
    }
    let _ = write!(out, "  result: {}", summary.disposition.as_str());
    out
}

fn list<T: std::fmt::Display>(out: &mut String, items: &[T]) {
    for item in items.iter().take(MAX_LISTED_FINDINGS) {
        let _ = writeln!(out, "    {item}");
    }
    if items.len() > MAX_LISTED_FINDINGS {
        let _ = writeln!(out, "    ... and {} more", items.len() - MAX_LISTED_FINDINGS);
    }
}
