use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Compiler output directory inside a checkout.
pub const OUTPUT_DIR: &str = "bin";
/// Build log directory inside a checkout.
pub const BUILD_LOG_DIR: &str = "build-logs";
/// Checkstyle log directory inside a checkout.
pub const STYLE_LOG_DIR: &str = "checkstyle-reports";

/// Find the Java sources of a checkout.
///
/// Looks under `src/` when it exists, otherwise walks the whole checkout.
/// Returns absolute paths, sorted and de-duplicated.
pub fn discover_java_sources(root: &Path) -> Result<Vec<PathBuf>> {
    let src = root.join("src");
    let base = if src.is_dir() { src } else { root.to_path_buf() };

    let walker = WalkDir::new(&base)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !should_skip(e));

    let mut files = Vec::new();
    for entry in walker {
        let entry =
            entry.with_context(|| format!("failed to walk {}", base.display()))?;
        if entry.file_type().is_file() && is_java(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// `path` relative to `root` for display; unchanged when outside it.
pub fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

fn is_java(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("java")
}

fn should_skip(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    matches!(
        entry.file_name().to_str().unwrap_or_default(),
        ".git" | OUTPUT_DIR | BUILD_LOG_DIR | STYLE_LOG_DIR | "target" | ".idea" | ".vscode"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "class X {}\n").unwrap();
    }

    #[test]
    fn prefers_src_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("src/Main.java"));
        touch(&dir.path().join("src/app/util/Helper.java"));
        touch(&dir.path().join("scratch/Ignored.java"));

        let files = discover_java_sources(dir.path()).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|f| relative(dir.path(), f).to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("src/Main.java"),
                PathBuf::from("src/app/util/Helper.java"),
            ]
        );
    }

    #[test]
    fn walks_whole_checkout_without_src() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Main.java"));
        touch(&dir.path().join("lab1/Task.java"));
        touch(&dir.path().join("notes.txt"));

        let files = discover_java_sources(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "java"));
    }

    #[test]
    fn skips_git_and_output_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(".git/hooks/Weird.java"));
        touch(&dir.path().join("bin/Stale.java"));
        touch(&dir.path().join("build-logs/Copy.java"));
        touch(&dir.path().join("Main.java"));

        let files = discover_java_sources(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("Main.java")]);
    }

    #[test]
    fn empty_checkout_has_no_sources() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_java_sources(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn relative_leaves_foreign_paths_alone() {
        let root = Path::new("/ws/proj");
        assert_eq!(
            relative(root, Path::new("/ws/proj/src/A.java")),
            Path::new("src/A.java")
        );
        assert_eq!(relative(root, Path::new("/etc/x")), Path::new("/etc/x"));
    }
}
