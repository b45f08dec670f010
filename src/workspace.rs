//! The on-disk checkout a run works in, and the lock that keeps runs from
//! overlapping on it.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::Result;

const LOCK_FILE: &str = ".javagate.lock";

/// A fetched project checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub root: PathBuf,
    pub branch: String,
    /// Commit checked out, when the fetcher knows it.
    pub head: Option<String>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            branch: branch.into(),
            head: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Exclusive advisory lock on a workspace directory, released on drop.
///
/// A second run against the same workspace blocks in [`WorkspaceLock::acquire`]
/// until the first one finishes.
#[derive(Debug)]
pub struct WorkspaceLock {
    file: File,
    path: PathBuf,
}

impl WorkspaceLock {
    pub fn acquire(workspace: &Path) -> Result<Self> {
        std::fs::create_dir_all(workspace)?;
        let path = workspace.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            tracing::info!(
                "Workspace {} is in use by another run; waiting",
                workspace.display()
            );
            file.lock_exclusive()?;
        }
        tracing::debug!("Locked workspace {}", workspace.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
