//! Local git fixtures for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// Run git in `dir` with a throwaway identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=Test Student",
            "-c",
            "user.email=student@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

/// An origin repository with a `main` branch holding `Main.java` and a
/// `feature` branch that adds `Feature.java`.
pub fn origin_repo(root: &Path) -> PathBuf {
    let origin = root.join("origin");
    std::fs::create_dir_all(origin.join("src")).unwrap();
    git(&origin, &["init", "-q"]);
    git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    std::fs::write(
        origin.join("src/Main.java"),
        "public class Main {\n    public static void main(String[] args) {}\n}\n",
    )
    .unwrap();
    git(&origin, &["add", "."]);
    git(&origin, &["commit", "-q", "-m", "initial"]);

    git(&origin, &["checkout", "-q", "-b", "feature"]);
    std::fs::write(origin.join("src/Feature.java"), "class Feature {}\n").unwrap();
    git(&origin, &["add", "."]);
    git(&origin, &["commit", "-q", "-m", "feature"]);
    git(&origin, &["checkout", "-q", "main"]);

    origin
}
