use std::path::Path;

use crate::build::BuildVerifier;
use crate::config::CheckConfig;
use crate::error::Result;
use crate::fetch::{FetchRequest, GitFetcher};
use crate::style::StyleChecker;
use crate::workspace::Workspace;

use super::types::StepResult;

/// Materializes the project on disk.
pub trait Fetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Workspace>;
}

/// Compiles a fetched workspace.
pub trait Builder {
    fn build(&self, workspace: &Workspace) -> Result<StepResult>;
}

/// Style-checks a fetched workspace.
pub trait StyleCheck {
    fn check(&self, workspace: &Workspace, style_config: Option<&Path>) -> Result<StepResult>;
}

impl Fetcher for GitFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Workspace> {
        GitFetcher::fetch(self, request)
    }
}

impl Builder for BuildVerifier {
    fn build(&self, workspace: &Workspace) -> Result<StepResult> {
        BuildVerifier::build(self, workspace)
    }
}

impl StyleCheck for StyleChecker {
    fn check(&self, workspace: &Workspace, style_config: Option<&Path>) -> Result<StepResult> {
        StyleChecker::check(self, workspace, style_config)
    }
}

/// The three collaborators one run drives.
#[derive(Debug, Clone)]
pub struct Steps<F, B, S> {
    pub fetcher: F,
    pub builder: B,
    pub style: S,
}

impl Steps<GitFetcher, BuildVerifier, StyleChecker> {
    /// The real tools, configured from `cfg`.
    pub fn from_config(cfg: &CheckConfig) -> Self {
        Self {
            fetcher: GitFetcher::new(cfg.tool_timeout),
            builder: BuildVerifier::from_config(cfg),
            style: StyleChecker::from_config(cfg),
        }
    }
}
