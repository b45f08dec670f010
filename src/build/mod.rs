//! Build verification: compile every Java source of a checkout with `javac`.

mod parse;

use std::fmt::Write as _;
use std::time::Duration;

pub use parse::{CompileError, parse_javac_output};

use crate::config::CheckConfig;
use crate::error::Result;
use crate::pipeline::{Findings, StepResult};
use crate::process::{self, ToolCommand, java_tool};
use crate::sources::{self, BUILD_LOG_DIR, OUTPUT_DIR};
use crate::workspace::Workspace;

pub const BUILD_LOG_FILE: &str = "build.log";

/// Compiles a checkout with `javac`.
#[derive(Debug, Clone)]
pub struct BuildVerifier {
    pub javac: String,
    pub timeout: Option<Duration>,
}

impl Default for BuildVerifier {
    fn default() -> Self {
        Self {
            javac: java_tool("javac"),
            timeout: None,
        }
    }
}

impl BuildVerifier {
    pub fn from_config(cfg: &CheckConfig) -> Self {
        Self {
            timeout: cfg.tool_timeout,
            ..Self::default()
        }
    }

    /// Compile the checkout into `<root>/bin`.
    ///
    /// Compile errors produce a `failure` result with the log attached; only
    /// a missing compiler or an IO problem is an error.
    pub fn build(&self, workspace: &Workspace) -> Result<StepResult> {
        let root = workspace.root();
        let log_dir = root.join(BUILD_LOG_DIR);
        std::fs::create_dir_all(&log_dir)?;
        let log_path = log_dir.join(BUILD_LOG_FILE);

        let mut log = String::new();
        let _ = writeln!(log, "=== Build Log for {} ===", root.display());
        let _ = writeln!(log, "Date: {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

        let files = sources::discover_java_sources(root)
            .map_err(|e| std::io::Error::other(format!("{e:#}")))?;
        if files.is_empty() {
            tracing::error!("No Java files found in the repository");
            log.push_str("ERROR No Java files found in the repository\n");
            std::fs::write(&log_path, &log)?;
            return Ok(StepResult::failure(
                "No Java files found in the repository",
                Some(log_path),
            ));
        }

        let _ = writeln!(log, "Found {} Java files to compile:", files.len());
        tracing::info!("Found {} Java files to compile", files.len());
        for file in &files {
            let rel = sources::relative(root, file);
            let _ = writeln!(log, "  - {}", rel.display());
            tracing::debug!("  - {}", rel.display());
        }

        let output_dir = root.join(OUTPUT_DIR);
        std::fs::create_dir_all(&output_dir)?;

        let cmd = ToolCommand::new(&self.javac)
            .args(["-encoding", "UTF-8", "-d"])
            .arg(output_dir.as_os_str())
            .args(files.iter().map(|f| f.as_os_str()))
            .env("JAVA_TOOL_OPTIONS", "-Dfile.encoding=UTF-8")
            .current_dir(root)
            .timeout(self.timeout);
        let _ = writeln!(log, "\nRunning: {}", cmd.display());

        let result = process::run(cmd)?;
        log.push_str(&result.log);

        let step = if result.success {
            log.push_str("\nSUCCESS All Java files compiled successfully\n");
            tracing::info!("All Java files compiled successfully");
            StepResult::success(
                format!("Compiled {} Java files", files.len()),
                Some(log_path.clone()),
            )
        } else if result.timed_out {
            log.push_str("\nERROR Compilation timed out\n");
            tracing::error!("Compilation timed out");
            StepResult::failure("Compilation timed out", Some(log_path.clone()))
        } else {
            let compile_errors: Vec<CompileError> = parse_javac_output(&result.log)
                .into_iter()
                .map(|e| CompileError {
                    file: sources::relative(root, &e.file).to_path_buf(),
                    ..e
                })
                .collect();
            let message = match compile_errors.len() {
                0 => format!("Compilation failed (exit {:?})", result.exit_code),
                1 => "Compilation failed with 1 error".to_string(),
                n => format!("Compilation failed with {n} errors"),
            };
            let _ = writeln!(log, "\nERROR {message}");
            tracing::error!("{message}");
            for e in &compile_errors {
                tracing::debug!("{e}");
            }
            StepResult::failure(message, Some(log_path.clone())).with_findings(Findings {
                issue_count: compile_errors.len(),
                compile_errors,
                ..Findings::default()
            })
        };

        std::fs::write(&log_path, &log)?;
        tracing::info!("Build log saved to: {}", log_path.display());
        Ok(step)
    }
}
