use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::CheckConfig;
use crate::error::{CheckError, Result};
use crate::pipeline::{Findings, StepResult};
use crate::process::{self, ToolCommand, java_tool};
use crate::sources::{self, STYLE_LOG_DIR};
use crate::workspace::Workspace;

use super::parse::{crashed_source, detect_tool_failure, parse_checkstyle_output};
use super::provision::{default_download_url, download_jar, http_client};

/// Ruleset bundled inside the Checkstyle jar, used when none is configured.
pub const DEFAULT_RULESET: &str = "/sun_checks.xml";
pub const STYLE_LOG_FILE: &str = "checkstyle.log";

/// Runs Checkstyle over a checkout.
#[derive(Debug, Clone)]
pub struct StyleChecker {
    pub java: String,
    pub jar: PathBuf,
    /// Where to fetch the jar from when it is missing. `None` means the jar
    /// must already be in place.
    pub download_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl StyleChecker {
    pub fn new(jar: impl Into<PathBuf>) -> Self {
        Self {
            java: java_tool("java"),
            jar: jar.into(),
            download_url: None,
            timeout: None,
        }
    }

    pub fn from_config(cfg: &CheckConfig) -> Self {
        Self {
            timeout: cfg.tool_timeout,
            download_url: cfg.checkstyle_download.then(default_download_url),
            ..Self::new(&cfg.checkstyle_jar)
        }
    }

    /// Check every Java source of `workspace` against `style_config`
    /// (or [`DEFAULT_RULESET`]). Violations are data: the result is a
    /// `failure` carrying findings, never an error.
    pub fn check(&self, workspace: &Workspace, style_config: Option<&Path>) -> Result<StepResult> {
        let root = workspace.root();
        if !self.jar.is_file() {
            self.provision_jar()?;
        }

        let ruleset = style_config
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_RULESET.to_string());

        let log_dir = root.join(STYLE_LOG_DIR);
        std::fs::create_dir_all(&log_dir)?;
        let log_path = log_dir.join(STYLE_LOG_FILE);

        let mut log = String::new();
        let _ = writeln!(log, "=== Checkstyle Report for {} ===", root.display());
        let _ = writeln!(log, "Date: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(log, "Configuration: {ruleset}\n");

        let files = sources::discover_java_sources(root)
            .map_err(|e| std::io::Error::other(format!("{e:#}")))?;
        if files.is_empty() {
            tracing::error!("No Java files found in the repository");
            log.push_str("No Java files found in the repository\n");
            std::fs::write(&log_path, &log)?;
            return Ok(StepResult::failure(
                "No Java files found in the repository",
                Some(log_path),
            ));
        }

        tracing::info!("Found {} Java files to check", files.len());

        // A file Checkstyle cannot parse aborts the whole audit. Record it,
        // drop it and audit the rest again.
        let mut remaining = files;
        let mut unparsed: Vec<PathBuf> = Vec::new();
        let result = loop {
            let cmd = self.command(&ruleset, &remaining, root);
            let _ = writeln!(log, "Running: {}\n", cmd.display());

            let result = process::run(cmd)?;
            log.push_str(&result.log);

            if result.timed_out {
                std::fs::write(&log_path, &log)?;
                return Err(CheckError::ToolFailed {
                    tool: "checkstyle".into(),
                    reason: format!("timed out; partial log at {}", log_path.display()),
                });
            }

            let Some(line) = detect_tool_failure(&result.log) else {
                break result;
            };
            let crashed = crashed_source(&result.log)
                .and_then(|p| remaining.iter().position(|f| f == &p || f.ends_with(&p)));
            let Some(index) = crashed else {
                std::fs::write(&log_path, &log)?;
                return Err(CheckError::ToolFailed {
                    tool: "checkstyle".into(),
                    reason: line,
                });
            };

            let file = sources::relative(root, &remaining.remove(index)).to_path_buf();
            tracing::warn!(
                "Checkstyle could not parse {}; excluding it from the audit",
                file.display()
            );
            let _ = writeln!(log, "\nCould not parse {}; re-running without it\n", file.display());
            unparsed.push(file);

            if remaining.is_empty() {
                let message = format!("Checkstyle could not parse any of the {} Java files", unparsed.len());
                let _ = writeln!(log, "\n\n=== Summary ===\n{message}");
                tracing::error!("{message}");
                std::fs::write(&log_path, &log)?;
                return Ok(StepResult::failure(message, Some(log_path)).with_findings(Findings {
                    unparsed,
                    ..Findings::default()
                }));
            }
        };

        let violations: Vec<_> = parse_checkstyle_output(&result.log)
            .into_iter()
            .map(|mut v| {
                v.file = sources::relative(root, &v.file).to_path_buf();
                v
            })
            .collect();
        let issues: Vec<_> = violations.iter().filter(|v| v.severity.is_issue()).collect();
        let issue_count = issues.len();
        let files_with_issues: BTreeSet<_> = issues.iter().map(|v| &v.file).collect();

        if !result.success && issue_count == 0 {
            std::fs::write(&log_path, &log)?;
            return Err(CheckError::ToolFailed {
                tool: "checkstyle".into(),
                reason: format!(
                    "exited with {:?} without reporting violations; see {}",
                    result.exit_code,
                    log_path.display()
                ),
            });
        }

        log.push_str("\n\n=== Summary ===\n");
        let mut message = if issue_count == 0 {
            log.push_str("No Checkstyle errors found.\n");
            tracing::info!("Checkstyle passed with no violations");
            "No Checkstyle violations".to_string()
        } else {
            let summary = format!(
                "{issue_count} style violations in {} files",
                files_with_issues.len()
            );
            let _ = writeln!(log, "Total: {summary}");
            tracing::warn!("Checkstyle found {summary}");
            summary
        };
        if !unparsed.is_empty() {
            let note = format!("{} files could not be parsed", unparsed.len());
            let _ = writeln!(log, "Not checked ({note}):");
            for file in &unparsed {
                let _ = writeln!(log, "  - {}", file.display());
            }
            message = format!("{message}; {note}");
        }
        std::fs::write(&log_path, &log)?;

        Ok(StepResult::from_findings(
            message,
            Some(log_path),
            Findings {
                issue_count,
                violations,
                unparsed,
                ..Findings::default()
            },
        ))
    }

    /// Download the jar if that is enabled, otherwise report it missing.
    fn provision_jar(&self) -> Result<()> {
        let Some(url) = &self.download_url else {
            return Err(CheckError::ToolMissing {
                tool: "checkstyle".into(),
                reason: format!(
                    "jar not found at {}; point checkstyle.jar (--checkstyle-jar) at a \
                     checkstyle-<version>-all.jar or enable checkstyle.download (--download-checkstyle)",
                    self.jar.display()
                ),
            });
        };

        tracing::info!("Downloading Checkstyle from {url} to {}", self.jar.display());
        let bytes = http_client(self.timeout)
            .and_then(|client| download_jar(&client, url, &self.jar))
            .map_err(|e| CheckError::ToolMissing {
                tool: "checkstyle".into(),
                reason: format!("{e:#}"),
            })?;
        tracing::info!("Downloaded {bytes} bytes");
        Ok(())
    }

    fn command(&self, ruleset: &str, files: &[PathBuf], root: &Path) -> ToolCommand {
        ToolCommand::new(&self.java)
            .arg("-Dfile.encoding=UTF-8")
            .arg("-jar")
            .arg(self.jar.as_os_str())
            .arg("-c")
            .arg(ruleset)
            .args(files.iter().map(|f| f.as_os_str()))
            .env("JAVA_TOOL_OPTIONS", "-Dfile.encoding=UTF-8")
            .current_dir(root)
            .timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StepStatus;

    fn workspace_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
        let ws = Workspace::new(dir.path(), "main");
        (dir, ws)
    }

    /// A stand-in for `java` that prints canned Checkstyle output.
    #[cfg(unix)]
    fn fake_java(dir: &Path, script: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-java");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn checker_in(dir: &Path) -> StyleChecker {
        let jar = dir.join("checkstyle.jar");
        std::fs::write(&jar, b"").unwrap();
        StyleChecker::new(jar)
    }

    #[test]
    fn missing_jar_is_tool_missing() {
        let (_dir, ws) = workspace_with(&[("src/Main.java", "class Main {}")]);
        let checker = StyleChecker::new("/no/such/checkstyle.jar");
        let err = checker.check(&ws, None).unwrap_err();
        assert!(matches!(err, CheckError::ToolMissing { ref tool, .. } if tool == "checkstyle"));
    }

    #[test]
    fn missing_jar_hint_names_both_options() {
        let (_dir, ws) = workspace_with(&[("src/Main.java", "class Main {}")]);
        let err = StyleChecker::new("/no/such/checkstyle.jar").check(&ws, None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("--checkstyle-jar"));
        assert!(msg.contains("checkstyle.download"));
    }

    #[test]
    fn failed_download_is_tool_missing() {
        let (dir, ws) = workspace_with(&[("src/Main.java", "class Main {}")]);
        let mut checker = StyleChecker::new(dir.path().join("cs").join("checkstyle.jar"));
        // Nothing listens on port 1.
        checker.download_url = Some("http://127.0.0.1:1/checkstyle-all.jar".into());
        let err = checker.check(&ws, None).unwrap_err();
        assert!(matches!(err, CheckError::ToolMissing { ref tool, .. } if tool == "checkstyle"));
        assert!(!checker.jar.exists());
    }

    #[test]
    fn download_follows_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = crate::config::validate(crate::config::Settings {
            gitlab_url: Some("https://gitlab.example.com".into()),
            token: Some("glpat-abc".into()),
            project_id: Some("course/student42".into()),
            workspace: Some(dir.path().to_path_buf()),
            ..crate::config::Settings::defaults()
        })
        .unwrap();
        assert_eq!(StyleChecker::from_config(&cfg).download_url, None);

        cfg.checkstyle_download = true;
        assert_eq!(
            StyleChecker::from_config(&cfg).download_url,
            Some(default_download_url())
        );
    }

    #[test]
    fn no_sources_is_failure_not_error() {
        let (dir, ws) = workspace_with(&[("README.md", "hi")]);
        let result = checker_in(dir.path()).check(&ws, None).unwrap();
        assert_eq!(result.status, StepStatus::Failure);
        assert!(result.log_path.unwrap().is_file());
    }

    #[cfg(unix)]
    #[test]
    fn violations_become_findings() {
        let (dir, ws) = workspace_with(&[("src/Main.java", "class Main {}")]);
        let root = dir.path().display().to_string();
        let mut checker = checker_in(dir.path());
        checker.java = fake_java(
            dir.path(),
            &format!(
                "echo 'Starting audit...'\n\
                 echo '[ERROR] {root}/src/Main.java:1:1: Missing a Javadoc comment. [JavadocType]'\n\
                 echo '[WARN] {root}/src/Main.java:1:7: Name is bad. [TypeName]'\n\
                 echo '[INFO] {root}/src/Main.java:1:1: Just saying.'\n\
                 echo 'Audit done.'\n\
                 exit 1"
            ),
        );

        let result = checker.check(&ws, None).unwrap();
        assert_eq!(result.status, StepStatus::Failure);
        assert_eq!(result.issue_count(), 2);
        let findings = result.findings.as_ref().unwrap();
        assert_eq!(findings.violations.len(), 3);
        assert_eq!(findings.violations[0].file, PathBuf::from("src/Main.java"));
        assert_eq!(result.message, "2 style violations in 1 files");

        let log = std::fs::read_to_string(result.log_path.unwrap()).unwrap();
        assert!(log.contains("Configuration: /sun_checks.xml"));
        assert!(log.contains("Total: 2 style violations in 1 files"));
    }

    #[cfg(unix)]
    #[test]
    fn clean_run_is_success() {
        let (dir, ws) = workspace_with(&[("src/Main.java", "class Main {}")]);
        let mut checker = checker_in(dir.path());
        checker.java = fake_java(dir.path(), "echo 'Starting audit...'; echo 'Audit done.'");

        let custom = dir.path().join("google_checks.xml");
        std::fs::write(&custom, "<module/>").unwrap();
        let result = checker.check(&ws, Some(&custom)).unwrap();
        assert_eq!(result.status, StepStatus::Success);
        assert_eq!(result.issue_count(), 0);

        let log = std::fs::read_to_string(result.log_path.unwrap()).unwrap();
        assert!(log.contains("google_checks.xml"));
        assert!(log.contains("No Checkstyle errors found."));
    }

    #[cfg(unix)]
    #[test]
    fn checkstyle_exception_is_tool_failure() {
        let (dir, ws) = workspace_with(&[("src/Main.java", "class Main {}")]);
        let mut checker = checker_in(dir.path());
        checker.java = fake_java(
            dir.path(),
            "echo 'com.puppycrawl.tools.checkstyle.api.CheckstyleException: cannot initialize module' >&2; exit 254",
        );
        let err = checker.check(&ws, None).unwrap_err();
        assert!(matches!(err, CheckError::ToolFailed { ref reason, .. } if reason.contains("CheckstyleException")));
    }

    #[cfg(unix)]
    #[test]
    fn unparseable_file_is_excluded_and_the_rest_checked() {
        let (dir, ws) = workspace_with(&[
            ("src/Broken.java", "class Broken {"),
            ("src/Main.java", "class Main {}"),
        ]);
        let mut checker = checker_in(dir.path());
        checker.java = fake_java(
            dir.path(),
            "for f in \"$@\"; do
               case \"$f\" in
                 *Broken.java)
                   echo \"[ERROR] $f:1:15: Got an exception - expecting '}'\"
                   echo \"com.puppycrawl.tools.checkstyle.api.CheckstyleException: Exception was thrown while processing $f\" >&2
                   exit 254 ;;
               esac
             done
             for f in \"$@\"; do last=\"$f\"; done
             echo \"[WARN] $last:1:7: Name is bad. [TypeName]\"
             exit 0",
        );

        let result = checker.check(&ws, None).unwrap();
        assert_eq!(result.status, StepStatus::Failure);
        assert_eq!(result.issue_count(), 1);
        assert_eq!(
            result.message,
            "1 style violations in 1 files; 1 files could not be parsed"
        );
        let findings = result.findings.as_ref().unwrap();
        assert_eq!(findings.unparsed, vec![PathBuf::from("src/Broken.java")]);
        assert_eq!(findings.violations.len(), 1);
        assert_eq!(findings.violations[0].file, PathBuf::from("src/Main.java"));

        let log = std::fs::read_to_string(result.log_path.unwrap()).unwrap();
        assert!(log.contains("Could not parse src/Broken.java"));
        assert!(log.contains("  - src/Broken.java"));
    }

    #[cfg(unix)]
    #[test]
    fn every_file_unparseable_is_failure_not_error() {
        let (dir, ws) = workspace_with(&[("src/Main.java", "class Main {")]);
        let mut checker = checker_in(dir.path());
        checker.java = fake_java(
            dir.path(),
            "echo \"[ERROR] $6:1:13: Got an exception - expecting '}'\"
             echo \"com.puppycrawl.tools.checkstyle.api.CheckstyleException: Exception was thrown while processing $6\" >&2
             exit 254",
        );

        let result = checker.check(&ws, None).unwrap();
        assert_eq!(result.status, StepStatus::Failure);
        assert_eq!(result.issue_count(), 0);
        assert_eq!(result.message, "Checkstyle could not parse any of the 1 Java files");
        assert_eq!(
            result.findings.unwrap().unparsed,
            vec![PathBuf::from("src/Main.java")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_without_findings_is_tool_failure() {
        let (dir, ws) = workspace_with(&[("src/Main.java", "class Main {}")]);
        let mut checker = checker_in(dir.path());
        checker.java = fake_java(dir.path(), "echo 'Error: Unable to access jarfile' >&2; exit 1");
        assert!(matches!(
            checker.check(&ws, None),
            Err(CheckError::ToolFailed { .. })
        ));
    }
}
