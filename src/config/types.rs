use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_WORKSPACE: &str = "java-projects";
pub const DEFAULT_CHECKSTYLE_JAR: &str = "checkstyle/checkstyle.jar";
pub const DEFAULT_RESULTS_DIR: &str = "quality-check-results";

/// One partially-specified configuration layer.
///
/// Defaults, the YAML file and the command line each produce a `Settings`;
/// [`Settings::overlay`] stacks them so the later layer wins field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub gitlab_url: Option<String>,
    pub token: Option<String>,
    pub project_id: Option<String>,
    pub project_hw: Option<String>,
    pub branch: Option<String>,
    pub workspace: Option<PathBuf>,
    pub checkstyle_config: Option<PathBuf>,
    pub checkstyle_jar: Option<PathBuf>,
    pub checkstyle_download: Option<bool>,
    pub ssh_url: Option<String>,
    pub accept_hostkey: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub fail_on_issues: Option<bool>,
    pub tool_timeout: Option<u64>,
    pub results_dir: Option<PathBuf>,
}

impl Settings {
    /// Built-in defaults, the lowest-precedence layer.
    pub fn defaults() -> Self {
        Self {
            branch: Some(DEFAULT_BRANCH.to_string()),
            workspace: Some(PathBuf::from(DEFAULT_WORKSPACE)),
            checkstyle_jar: Some(PathBuf::from(DEFAULT_CHECKSTYLE_JAR)),
            checkstyle_download: Some(false),
            accept_hostkey: Some(false),
            fail_on_issues: Some(false),
            results_dir: Some(PathBuf::from(DEFAULT_RESULTS_DIR)),
            ..Self::default()
        }
    }

    /// Return `self` with every field that `upper` sets replaced by `upper`'s value.
    pub fn overlay(self, upper: Settings) -> Settings {
        Settings {
            gitlab_url: upper.gitlab_url.or(self.gitlab_url),
            token: upper.token.or(self.token),
            project_id: upper.project_id.or(self.project_id),
            project_hw: upper.project_hw.or(self.project_hw),
            branch: upper.branch.or(self.branch),
            workspace: upper.workspace.or(self.workspace),
            checkstyle_config: upper.checkstyle_config.or(self.checkstyle_config),
            checkstyle_jar: upper.checkstyle_jar.or(self.checkstyle_jar),
            checkstyle_download: upper.checkstyle_download.or(self.checkstyle_download),
            ssh_url: upper.ssh_url.or(self.ssh_url),
            accept_hostkey: upper.accept_hostkey.or(self.accept_hostkey),
            username: upper.username.or(self.username),
            password: upper.password.or(self.password),
            fail_on_issues: upper.fail_on_issues.or(self.fail_on_issues),
            tool_timeout: upper.tool_timeout.or(self.tool_timeout),
            results_dir: upper.results_dir.or(self.results_dir),
        }
    }
}

/// How `git` authenticates against the remote.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// GitLab personal/project access token over HTTPS.
    Token(String),
    /// Username and password over HTTPS.
    Basic { username: String, password: String },
    /// Key-based SSH; the key itself comes from the user's ssh agent/config.
    Ssh { accept_host_key: bool },
    /// Location used as given (local paths, public mirrors).
    Anonymous,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Token(_) => "token",
            AuthMethod::Basic { .. } => "basic",
            AuthMethod::Ssh { .. } => "ssh",
            AuthMethod::Anonymous => "anonymous",
        }
    }
}

// Secrets must not end up in debug logs.
impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Token(_) => f.write_str("Token(***)"),
            AuthMethod::Basic { username, .. } => {
                write!(f, "Basic {{ username: {username:?}, password: *** }}")
            }
            AuthMethod::Ssh { accept_host_key } => {
                write!(f, "Ssh {{ accept_host_key: {accept_host_key} }}")
            }
            AuthMethod::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Where the project lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub location: String,
    pub auth: AuthMethod,
}

/// Fully resolved, validated configuration for one run.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub remote: Remote,
    pub project_id: String,
    pub project_hw: Option<String>,
    pub branch: String,
    pub workspace: PathBuf,
    /// Custom Checkstyle ruleset; `None` selects the bundled Sun checks.
    pub style_config: Option<PathBuf>,
    pub checkstyle_jar: PathBuf,
    /// Fetch the jar into `checkstyle_jar` when it is missing.
    pub checkstyle_download: bool,
    pub fail_on_issues: bool,
    pub tool_timeout: Option<Duration>,
    pub results_dir: PathBuf,
}

impl CheckConfig {
    /// Directory the project is cloned into: `workspace/<project>[/<hw>]`.
    pub fn checkout_dir(&self) -> PathBuf {
        let mut dir = self.workspace.join(&self.project_id);
        if let Some(hw) = &self.project_hw {
            dir.push(hw);
        }
        dir
    }
}

/// Run metadata carried into the summary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMeta {
    pub project_id: String,
    pub project_hw: Option<String>,
    pub branch: String,
    pub fail_on_issues: bool,
    pub checkout: PathBuf,
}

impl From<&CheckConfig> for RunMeta {
    fn from(cfg: &CheckConfig) -> Self {
        Self {
            project_id: cfg.project_id.clone(),
            project_hw: cfg.project_hw.clone(),
            branch: cfg.branch.clone(),
            fail_on_issues: cfg.fail_on_issues,
            checkout: cfg.checkout_dir(),
        }
    }
}
