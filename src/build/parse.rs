use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One `javac` error diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileError {
    pub file: PathBuf,
    pub line: usize,
    /// 1-based, taken from the `^` marker under the quoted source line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub message: String,
    /// The offending source line as javac quoted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_context: Option<String>,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)?;
        if let Some(col) = self.column {
            write!(f, ":{col}")?;
        }
        write!(f, ": error: {}", self.message)
    }
}

/// Parse `javac` output into its error diagnostics.
///
/// Expects the default layout:
/// ```text
/// src/Main.java:3: error: ';' expected
///         int x = 1
///                  ^
/// 1 error
/// ```
/// Warnings and notes are skipped, along with their source excerpts.
pub fn parse_javac_output(raw: &str) -> Vec<CompileError> {
    let mut errors: Vec<CompileError> = Vec::new();
    // Whether the lines that follow still belong to the last error.
    let mut open = false;
    let mut context: Option<&str> = None;

    for line in raw.lines() {
        if let Some(error) = parse_error(line) {
            errors.push(error);
            open = true;
            context = None;
            continue;
        }
        if is_other_diagnostic(line) {
            open = false;
            continue;
        }
        if !open {
            continue;
        }

        if line.trim() == "^" {
            if let Some(current) = errors.last_mut() {
                current.column = line.find('^').map(|i| line[..i].chars().count() + 1);
                current.code_context = context.map(|c| c.trim().to_string());
            }
            open = false;
        } else if context.is_none() {
            context = Some(line);
        }
    }

    errors
}

/// `path:line: error: message`, tolerating drive letters in the path.
fn parse_error(line: &str) -> Option<CompileError> {
    let (location, message) = line.split_once(": error: ")?;
    let (file, line_no) = location.rsplit_once(':')?;
    let line_no: usize = line_no.trim().parse().ok()?;
    if file.is_empty() {
        return None;
    }

    Some(CompileError {
        file: PathBuf::from(file),
        line: line_no,
        column: None,
        message: message.trim().to_string(),
        code_context: None,
    })
}

fn is_other_diagnostic(line: &str) -> bool {
    line.contains(": warning: ") || line.contains(": note: ") || line.starts_with("Note: ")
}
