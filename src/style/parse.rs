use std::path::PathBuf;

use super::{Severity, Violation};

/// Parse Checkstyle's plain-format output into violations.
///
/// Expects the default `-f plain` layout:
/// ```text
/// Starting audit...
/// [ERROR] /work/src/Main.java:12:5: '{' at column 5 should be on the previous line. [LeftCurly]
/// [WARN] /work/src/Main.java:3: Missing a Javadoc comment. [JavadocType]
/// Audit done.
/// Checkstyle ends with 1 errors.
/// ```
pub fn parse_checkstyle_output(raw: &str) -> Vec<Violation> {
    raw.lines().filter_map(|l| parse_entry(l.trim())).collect()
}

/// Return the first line reporting a Checkstyle crash, if any. Such output
/// means the checker could not run, not that the code has violations.
pub fn detect_tool_failure(raw: &str) -> Option<String> {
    raw.lines()
        .find(|l| l.contains("CheckstyleException"))
        .map(|l| l.trim().to_string())
}

/// The source named by a crash of the form
/// `CheckstyleException: Exception was thrown while processing <path>`.
/// Such a crash is tied to one file the parser could not read, unlike a
/// broken ruleset or an unreadable jar.
pub fn crashed_source(raw: &str) -> Option<PathBuf> {
    raw.lines().find_map(|l| {
        let (_, rest) = l.split_once("CheckstyleException")?;
        let (_, path) = rest.split_once("while processing ")?;
        let path = path.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    })
}

/// Expected format: `[SEVERITY] path:line[:col]: message [Rule]`
fn parse_entry(line: &str) -> Option<Violation> {
    let rest = line.strip_prefix('[')?;
    let (tag, rest) = rest.split_once(']')?;
    let severity = Severity::from_tag(tag)?;

    let (location, body) = rest.trim_start().split_once(": ")?;
    let (file, line_no, column) = parse_location(location)?;
    let (message, rule) = split_rule(body.trim());

    Some(Violation {
        severity,
        file: PathBuf::from(file),
        line: line_no,
        column,
        message,
        rule,
    })
}

/// Split `path:line[:col]`, tolerating drive letters in the path.
fn parse_location(loc: &str) -> Option<(&str, usize, Option<usize>)> {
    let (head, last) = loc.rsplit_once(':')?;
    let last: usize = last.parse().ok()?;

    if let Some((path, line)) = head.rsplit_once(':')
        && let Ok(line) = line.parse::<usize>()
    {
        return Some((path, line, Some(last)));
    }

    Some((head, last, None))
}

/// Split a trailing ` [RuleName]` off the message.
fn split_rule(body: &str) -> (String, Option<String>) {
    if let Some(stripped) = body.strip_suffix(']')
        && let Some((message, rule)) = stripped.rsplit_once(" [")
        && !rule.is_empty()
        && !rule.contains(' ')
    {
        return (message.trim_end().to_string(), Some(rule.to_string()));
    }
    (body.to_string(), None)
}
