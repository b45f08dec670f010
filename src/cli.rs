//! Command-line arguments via `clap`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use javagate::config::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "javagate",
    version,
    about = "Clone a Java assignment, check that it builds, and run Checkstyle on it",
    long_about = "Clone (or update) a student's Java project from GitLab, compile it with javac, \
run Checkstyle over the sources, and write a summary to the results directory.\n\n\
Configuration precedence: command line > config file > defaults.",
    after_help = "Examples:\n  javagate --config quality.yaml\n  javagate --gitlab-url https://gitlab.example.com --token $TOKEN --project-id course/student42 --project-hw hw3\n  javagate --config quality.yaml --fail-on-issues --json"
)]
pub struct Cli {
    #[arg(long, value_name = "FILE", help = "YAML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "URL", help = "GitLab base URL")]
    pub gitlab_url: Option<String>,

    #[arg(long, help = "GitLab access token")]
    pub token: Option<String>,

    #[arg(long, value_name = "ID", help = "Project path on GitLab, e.g. course/student42")]
    pub project_id: Option<String>,

    #[arg(long, value_name = "HW", help = "Assignment directory below the project")]
    pub project_hw: Option<String>,

    #[arg(long, help = "Branch to check (default: main)")]
    pub branch: Option<String>,

    #[arg(long, value_name = "DIR", help = "Where checkouts live (default: java-projects)")]
    pub workspace: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Checkstyle ruleset (default: bundled sun_checks.xml)")]
    pub checkstyle_config: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Checkstyle all-in-one jar")]
    pub checkstyle_jar: Option<PathBuf>,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        overrides_with = "no_download_checkstyle",
        help = "Download the Checkstyle jar if it is missing"
    )]
    pub download_checkstyle: bool,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        overrides_with = "download_checkstyle",
        help = "Never download the Checkstyle jar"
    )]
    pub no_download_checkstyle: bool,

    #[arg(long, value_name = "URL", help = "Clone over SSH from this URL instead of HTTPS")]
    pub ssh_url: Option<String>,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        overrides_with = "no_accept_hostkey",
        help = "Accept unknown SSH host keys"
    )]
    pub accept_hostkey: bool,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        overrides_with = "accept_hostkey",
        help = "Require known SSH host keys, even if the config file accepts unknown ones"
    )]
    pub no_accept_hostkey: bool,

    #[arg(long, help = "Username for HTTPS basic auth")]
    pub username: Option<String>,

    #[arg(long, help = "Password for HTTPS basic auth")]
    pub password: Option<String>,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        overrides_with = "no_fail_on_issues",
        help = "Fail the run on a build failure or any style issue"
    )]
    pub fail_on_issues: bool,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        overrides_with = "fail_on_issues",
        help = "Always pass, even if the config file sets fail_on_issues"
    )]
    pub no_fail_on_issues: bool,

    #[arg(long, value_name = "DIR", help = "Results directory (default: quality-check-results)")]
    pub results_dir: Option<PathBuf>,

    #[arg(long = "timeout", value_name = "SECS", help = "Kill any tool running longer than this")]
    pub timeout: Option<u64>,

    #[arg(long, action = ArgAction::SetTrue, help = "Verify git, javac and java before running")]
    pub check_tools: bool,

    #[arg(short, long, action = ArgAction::SetTrue, help = "Debug logging")]
    pub verbose: bool,

    #[arg(long, action = ArgAction::SetTrue, help = "Print the summary as JSON")]
    pub json: bool,
}

impl Cli {
    /// The command-line configuration layer. Each boolean has an on and an
    /// off flag (the later one wins); leaving both out defers to the file or
    /// the default.
    pub fn settings(&self) -> Settings {
        Settings {
            gitlab_url: self.gitlab_url.clone(),
            token: self.token.clone(),
            project_id: self.project_id.clone(),
            project_hw: self.project_hw.clone(),
            branch: self.branch.clone(),
            workspace: self.workspace.clone(),
            checkstyle_config: self.checkstyle_config.clone(),
            checkstyle_jar: self.checkstyle_jar.clone(),
            checkstyle_download: switch(self.download_checkstyle, self.no_download_checkstyle),
            ssh_url: self.ssh_url.clone(),
            accept_hostkey: switch(self.accept_hostkey, self.no_accept_hostkey),
            username: self.username.clone(),
            password: self.password.clone(),
            fail_on_issues: switch(self.fail_on_issues, self.no_fail_on_issues),
            tool_timeout: self.timeout,
            results_dir: self.results_dir.clone(),
        }
    }
}

fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
