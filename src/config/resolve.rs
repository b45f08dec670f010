use std::path::Path;
use std::time::Duration;

use crate::error::{CheckError, Result};

use super::loader::ConfigFile;
use super::types::{AuthMethod, CheckConfig, Remote, Settings};

/// Merge defaults < config file < overrides and validate the result.
///
/// Fails with [`CheckError::Config`] before anything touches the network or
/// spawns a process.
pub fn resolve(config_file: Option<&Path>, overrides: Settings) -> Result<CheckConfig> {
    let mut settings = Settings::defaults();

    if let Some(path) = config_file {
        let file = ConfigFile::load(path).map_err(|e| CheckError::config(format!("{e:#}")))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        settings = settings.overlay(file.into_settings(base));
        tracing::info!("Configuration loaded from {}", path.display());
    } else {
        tracing::info!("Using command-line arguments");
    }

    validate(settings.overlay(overrides))
}

/// Turn a fully layered `Settings` into a `CheckConfig`.
pub fn validate(s: Settings) -> Result<CheckConfig> {
    let project_id = required(s.project_id, "project id", "--project-id", "project.id")?;
    let project_hw = non_blank(s.project_hw);

    let branch = s.branch.unwrap_or_default();
    if branch.trim().is_empty() {
        return Err(CheckError::config("branch must not be blank"));
    }

    let remote = resolve_remote(
        non_blank(s.gitlab_url),
        non_blank(s.ssh_url),
        non_blank(s.token),
        non_blank(s.username),
        s.password.filter(|p| !p.is_empty()),
        s.accept_hostkey.unwrap_or(false),
        &project_id,
        project_hw.as_deref(),
    )?;

    if let Some(style) = &s.checkstyle_config
        && !style.is_file()
    {
        return Err(CheckError::config(format!(
            "Checkstyle config not found: {}",
            style.display()
        )));
    }

    if s.tool_timeout == Some(0) {
        return Err(CheckError::config("tool timeout must be a positive number of seconds"));
    }

    Ok(CheckConfig {
        remote,
        project_id,
        project_hw,
        branch,
        workspace: s.workspace.unwrap_or_else(|| super::DEFAULT_WORKSPACE.into()),
        style_config: s.checkstyle_config,
        checkstyle_jar: s
            .checkstyle_jar
            .unwrap_or_else(|| super::DEFAULT_CHECKSTYLE_JAR.into()),
        checkstyle_download: s.checkstyle_download.unwrap_or(false),
        fail_on_issues: s.fail_on_issues.unwrap_or(false),
        tool_timeout: s.tool_timeout.map(Duration::from_secs),
        results_dir: s
            .results_dir
            .unwrap_or_else(|| super::DEFAULT_RESULTS_DIR.into()),
    })
}

#[allow(clippy::too_many_arguments)]
fn resolve_remote(
    gitlab_url: Option<String>,
    ssh_url: Option<String>,
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    accept_host_key: bool,
    project_id: &str,
    project_hw: Option<&str>,
) -> Result<Remote> {
    // An explicit SSH URL overrides whatever the GitLab URL would give.
    if let Some(location) = ssh_url {
        return Ok(Remote {
            location,
            auth: AuthMethod::Ssh { accept_host_key },
        });
    }

    let base = gitlab_url.ok_or_else(|| {
        CheckError::config(
            "GitLab URL is required. Provide it via --gitlab-url or gitlab.url in the config file.",
        )
    })?;

    let auth = match (token, username, password) {
        (Some(token), _, _) => AuthMethod::Token(token),
        (None, Some(username), Some(password)) => AuthMethod::Basic { username, password },
        _ => {
            return Err(CheckError::config(
                "GitLab token is required. Provide it via --token or gitlab.token in the config file \
                 (or set both username and password).",
            ));
        }
    };

    Ok(Remote {
        location: clone_url(&base, project_id, project_hw),
        auth,
    })
}

/// Build the HTTPS clone URL from a GitLab server or API URL.
pub fn clone_url(gitlab_url: &str, project_id: &str, project_hw: Option<&str>) -> String {
    let base = gitlab_url.trim_end_matches('/');
    let base = base.strip_suffix("/api/v4").unwrap_or(base);
    let path = match project_hw {
        Some(hw) => format!("{}/{}", project_id.trim_matches('/'), hw.trim_matches('/')),
        None => project_id.trim_matches('/').to_string(),
    };
    format!("{base}/{path}.git")
}

fn required(value: Option<String>, what: &str, flag: &str, key: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| {
        let mut chars = what.chars();
        let title = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        CheckError::config(format!(
            "{title} is required. Provide it via {flag} or {key} in the config file."
        ))
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
