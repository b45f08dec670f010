use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use super::types::Settings;

/// On-disk YAML layout. Every section and key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub gitlab: GitlabSection,
    pub project: ProjectSection,
    pub workspace: WorkspaceSection,
    pub checkstyle: CheckstyleSection,
    pub git: GitSection,
    pub quality: QualitySection,
    pub results: ResultsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitlabSection {
    pub url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSection {
    pub id: Option<String>,
    pub hw: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckstyleSection {
    pub config_path: Option<PathBuf>,
    pub jar: Option<PathBuf>,
    /// Download the jar to `jar` when it is missing.
    pub download: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitSection {
    pub ssh_url: Option<String>,
    pub accept_hostkey: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualitySection {
    pub fail_on_issues: Option<bool>,
    /// Seconds before a single tool invocation is killed.
    pub tool_timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResultsSection {
    pub dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Load and parse a YAML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        // An empty document deserializes to unit, not a mapping.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Flatten into a settings layer. Relative paths are resolved against
    /// `base`, the directory holding the file.
    pub fn into_settings(self, base: &Path) -> Settings {
        let rel = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };

        Settings {
            gitlab_url: self.gitlab.url,
            token: self.gitlab.token,
            project_id: self.project.id,
            project_hw: self.project.hw,
            branch: self.project.branch,
            workspace: self.workspace.path.map(rel),
            checkstyle_config: self.checkstyle.config_path.map(rel),
            checkstyle_jar: self.checkstyle.jar.map(rel),
            checkstyle_download: self.checkstyle.download,
            ssh_url: self.git.ssh_url,
            accept_hostkey: self.git.accept_hostkey,
            username: self.git.username,
            password: self.git.password,
            fail_on_issues: self.quality.fail_on_issues,
            tool_timeout: self.quality.tool_timeout,
            results_dir: self.results.dir.map(rel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_layout() {
        let yaml = "\
gitlab:
  url: https://gitlab.example.com/api/v4
  token: glpat-abc
project:
  id: course/student42
  hw: hw3
  branch: submit
workspace:
  path: /srv/ws
checkstyle:
  config_path: rules/google_checks.xml
  download: true
git:
  accept_hostkey: true
  username: student42
quality:
  fail_on_issues: true
  tool_timeout: 120
";
        let file = ConfigFile::parse(yaml).unwrap();
        let s = file.into_settings(Path::new("/etc/javagate"));
        assert_eq!(
            s.gitlab_url.as_deref(),
            Some("https://gitlab.example.com/api/v4")
        );
        assert_eq!(s.token.as_deref(), Some("glpat-abc"));
        assert_eq!(s.project_id.as_deref(), Some("course/student42"));
        assert_eq!(s.project_hw.as_deref(), Some("hw3"));
        assert_eq!(s.branch.as_deref(), Some("submit"));
        assert_eq!(s.workspace, Some(PathBuf::from("/srv/ws")));
        assert_eq!(
            s.checkstyle_config,
            Some(PathBuf::from("/etc/javagate/rules/google_checks.xml"))
        );
        assert_eq!(s.checkstyle_download, Some(true));
        assert_eq!(s.accept_hostkey, Some(true));
        assert_eq!(s.username.as_deref(), Some("student42"));
        assert_eq!(s.fail_on_issues, Some(true));
        assert_eq!(s.tool_timeout, Some(120));
        assert!(s.ssh_url.is_none());
    }

    #[test]
    fn empty_file_is_all_unset() {
        let s = ConfigFile::parse("").unwrap().into_settings(Path::new("."));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn partial_sections_are_fine() {
        let s = ConfigFile::parse("project:\n  id: demo\n")
            .unwrap()
            .into_settings(Path::new("."));
        assert_eq!(s.project_id.as_deref(), Some("demo"));
        assert!(s.branch.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ConfigFile::parse("quality:\n  fail_on_issue: true\n").is_err());
        assert!(ConfigFile::parse("gitlabb:\n  url: x\n").is_err());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(ConfigFile::parse("quality:\n  fail_on_issues: maybe\n").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigFile::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.yaml"));
    }
}
