//! Repository fetching through the `git` command line.
//!
//! Credentials never appear on the command line or in `.git/config`: they are
//! handed to git through an inline credential helper that reads them from the
//! child's environment.

mod git;

pub use git::{GitFetcher, redact_url};

use std::path::PathBuf;

use crate::config::{AuthMethod, CheckConfig};

/// Everything needed to materialize one checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub location: String,
    /// Branch to check out.
    pub reference: String,
    pub destination: PathBuf,
    pub auth: AuthMethod,
}

impl FetchRequest {
    pub fn from_config(cfg: &CheckConfig) -> Self {
        Self {
            location: cfg.remote.location.clone(),
            reference: cfg.branch.clone(),
            destination: cfg.checkout_dir(),
            auth: cfg.remote.auth.clone(),
        }
    }
}
