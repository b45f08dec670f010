use std::path::{Path, PathBuf};

use crate::error::{CheckError, Result};

use super::run::run;
use super::types::ToolCommand;

/// Resolve a JDK tool: `$JAVA_HOME/bin/<name>` when present, else the bare
/// name for a PATH lookup.
pub fn java_tool(name: &str) -> String {
    java_tool_in(std::env::var_os("JAVA_HOME").map(PathBuf::from).as_deref(), name)
}

fn java_tool_in(java_home: Option<&Path>, name: &str) -> String {
    if let Some(home) = java_home {
        let exe = if cfg!(windows) {
            format!("{name}.exe")
        } else {
            name.to_string()
        };
        let candidate = home.join("bin").join(exe);
        if candidate.is_file() {
            return candidate.to_string_lossy().into_owned();
        }
    }
    name.to_string()
}

/// Verify that a tool can be invoked, returning the first line it prints
/// for `version_args` (JDK tools print their version on stderr).
pub fn ensure_available(program: &str, version_args: &[&str]) -> Result<String> {
    let result = run(ToolCommand::new(program).args(version_args.iter().copied()))?;
    if !result.success {
        return Err(CheckError::ToolMissing {
            tool: program.to_string(),
            reason: format!(
                "`{}` exited with {:?}",
                ToolCommand::new(program).args(version_args.iter().copied()).display(),
                result.exit_code
            ),
        });
    }
    Ok(result
        .log
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .to_string())
}
