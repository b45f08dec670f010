use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::Client;

/// Checkstyle release fetched when downloading is enabled.
pub const CHECKSTYLE_VERSION: &str = "10.21.3";

pub fn default_download_url() -> String {
    format!(
        "https://github.com/checkstyle/checkstyle/releases/download/checkstyle-{v}/checkstyle-{v}-all.jar",
        v = CHECKSTYLE_VERSION
    )
}

pub fn http_client(timeout: Option<Duration>) -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(concat!("javagate/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

/// Download `url` to `dest`, creating parent directories. The body goes to
/// a `.part` file first and is renamed into place once complete, so a
/// failed transfer leaves no jar behind. Returns the byte count.
pub fn download_jar(client: &Client, url: &str, dest: &Path) -> anyhow::Result<u64> {
    if let Some(dir) = dest.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let part = part_path(dest);
    let result = fetch_to(client, url, &part);
    match result {
        Ok(bytes) => {
            std::fs::rename(&part, dest)
                .with_context(|| format!("failed to move jar into {}", dest.display()))?;
            Ok(bytes)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&part);
            Err(e)
        }
    }
}

fn fetch_to(client: &Client, url: &str, path: &Path) -> anyhow::Result<u64> {
    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("download from {url} failed"))?;

    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let bytes = response
        .copy_to(&mut file)
        .with_context(|| format!("failed to read body of {url}"))?;
    file.flush()?;
    Ok(bytes)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
