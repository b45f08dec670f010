//! Infrastructure errors that abort a run.
//!
//! Build and style findings are never errors; they travel as
//! [`StepResult`](crate::pipeline::StepResult) data. Everything here means the
//! run could not be carried out at all.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for a run whose quality gate failed.
pub const EXIT_GATE_FAILED: i32 = 1;
/// Exit code for configuration, fetch, tool or report failures.
pub const EXIT_INFRASTRUCTURE: i32 = 2;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("required tool `{tool}` is not available: {reason}")]
    ToolMissing { tool: String, reason: String },

    #[error("`{tool}` failed to run: {reason}")]
    ToolFailed { tool: String, reason: String },

    #[error("failed to write report artifact {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CheckError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Every infrastructure failure shares one exit code, distinct from the
    /// quality-gate code.
    pub fn exit_code(&self) -> i32 {
        EXIT_INFRASTRUCTURE
    }
}

pub type Result<T, E = CheckError> = std::result::Result<T, E>;
