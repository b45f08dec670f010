//! End-to-end runs against a local origin, with shell scripts standing in
//! for `javac` and the Checkstyle launcher.
//!
//! Unix only; skipped when git is not installed.

#![cfg(unix)]

mod common;

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use javagate::build::BuildVerifier;
use javagate::config::{AuthMethod, CheckConfig, Remote};
use javagate::fetch::GitFetcher;
use javagate::pipeline::{self, Disposition, StepStatus, Steps};
use javagate::report::SUMMARY_FILE;
use javagate::style::StyleChecker;

use common::{git_available, origin_repo};

fn script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

fn config(root: &Path, origin: &Path, fail_on_issues: bool) -> CheckConfig {
    CheckConfig {
        remote: Remote {
            location: origin.to_string_lossy().into_owned(),
            auth: AuthMethod::Anonymous,
        },
        project_id: "course/student42".into(),
        project_hw: None,
        branch: "main".into(),
        workspace: root.join("ws"),
        style_config: None,
        checkstyle_jar: root.join("checkstyle.jar"),
        checkstyle_download: false,
        fail_on_issues,
        tool_timeout: None,
        results_dir: root.join("results"),
    }
}

/// `javac` that succeeds or prints one diagnostic and exits 1.
fn javac(root: &Path, ok: bool) -> String {
    if ok {
        script(root, "javac-ok", "exit 0")
    } else {
        script(
            root,
            "javac-broken",
            "echo 'src/Main.java:2: error: cannot find symbol' >&2\necho '1 error' >&2\nexit 1",
        )
    }
}

/// `java -Dfile.encoding=UTF-8 -jar <jar> -c <rules> <files...>` printing
/// one warning against the first source file.
fn checkstyle(root: &Path) -> String {
    script(
        root,
        "java",
        "echo 'Starting audit...'\n\
         echo \"[WARN] $6:1: Missing a Javadoc comment. [MissingJavadocType]\"\n\
         echo 'Audit done.'\n\
         exit 0",
    )
}

fn steps(root: &Path, cfg: &CheckConfig, build_ok: bool) -> Steps<GitFetcher, BuildVerifier, StyleChecker> {
    std::fs::write(&cfg.checkstyle_jar, "not really a jar").unwrap();
    let mut steps = Steps::from_config(cfg);
    steps.builder.javac = javac(root, build_ok);
    steps.style.java = checkstyle(root);
    steps
}

fn read_summary(cfg: &CheckConfig) -> serde_json::Value {
    let raw = std::fs::read_to_string(cfg.results_dir.join(SUMMARY_FILE)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn strict_run_fails_on_style_warning() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let origin = origin_repo(dir.path());
    let cfg = config(dir.path(), &origin, true);

    let (summary, artifacts) = pipeline::run_and_report(&cfg, &steps(dir.path(), &cfg, true)).unwrap();

    assert_eq!(summary.build.status, StepStatus::Success);
    let lint = summary.lint.as_ref().expect("lint ran");
    assert_eq!(lint.status, StepStatus::Failure);
    assert_eq!(summary.lint_issue_count, 1);
    let violation = &lint.findings.as_ref().unwrap().violations[0];
    assert_eq!(violation.file, PathBuf::from("src/Main.java"));
    assert_eq!(summary.disposition, Disposition::Failed);
    assert_eq!(summary.exit_code(), 1);

    assert!(artifacts.build_log.is_some());
    assert!(artifacts.style_log.is_some());
    assert_eq!(read_summary(&cfg)["disposition"], "failed");
}

#[test]
fn strict_run_skips_style_after_build_failure() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let origin = origin_repo(dir.path());
    let cfg = config(dir.path(), &origin, true);

    let (summary, artifacts) = pipeline::run_and_report(&cfg, &steps(dir.path(), &cfg, false)).unwrap();

    assert_eq!(summary.build.status, StepStatus::Failure);
    assert_eq!(summary.build.message, "Compilation failed with 1 error");
    assert!(summary.lint.is_none());
    assert_eq!(summary.disposition, Disposition::Failed);
    assert!(artifacts.style_log.is_none());

    let json = read_summary(&cfg);
    assert_eq!(json["lint_status"], "skipped");
    assert!(json.get("lint").is_none());
    let error = &json["build"]["findings"]["compile_errors"][0];
    assert_eq!(error["file"], "src/Main.java");
    assert_eq!(error["line"], 2);
    assert_eq!(error["message"], "cannot find symbol");
    let build_log = std::fs::read_to_string(artifacts.build_log.unwrap()).unwrap();
    assert!(build_log.contains("cannot find symbol"));
}

#[test]
fn lenient_run_passes_despite_findings() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let origin = origin_repo(dir.path());
    let cfg = config(dir.path(), &origin, false);

    let (summary, _) = pipeline::run_and_report(&cfg, &steps(dir.path(), &cfg, false)).unwrap();

    assert_eq!(summary.build.status, StepStatus::Failure);
    assert_eq!(summary.lint_status(), StepStatus::Failure);
    assert_eq!(summary.disposition, Disposition::Passed);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn lenient_run_survives_unparseable_source() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let origin = origin_repo(dir.path());
    let cfg = config(dir.path(), &origin, false);

    let mut steps = steps(dir.path(), &cfg, false);
    steps.style.java = script(
        dir.path(),
        "java-crash",
        "echo 'Starting audit...'\n\
         echo \"[ERROR] $6:1:1: Got an exception - unexpected token\"\n\
         echo \"com.puppycrawl.tools.checkstyle.api.CheckstyleException: Exception was thrown while processing $6\" >&2\n\
         exit 254",
    );

    let (summary, artifacts) = pipeline::run_and_report(&cfg, &steps).unwrap();

    assert_eq!(summary.disposition, Disposition::Passed);
    assert_eq!(summary.exit_code(), 0);
    assert!(artifacts.summary.is_file());

    let lint = summary.lint.as_ref().expect("lint ran");
    assert_eq!(lint.status, StepStatus::Failure);
    assert_eq!(summary.lint_issue_count, 0);
    assert_eq!(
        lint.findings.as_ref().unwrap().unparsed,
        vec![PathBuf::from("src/Main.java")]
    );
    assert_eq!(read_summary(&cfg)["lint"]["findings"]["unparsed"][0], "src/Main.java");
}
