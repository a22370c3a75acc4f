// This file handles update checking for the `typo3-bootstrap` tool.
// It compares the compiled-in version against the latest release published on GitHub.
// The executable is never replaced; `--self-update` only prints how to upgrade.

use crate::{log_error, log_info, log_warn}; // Custom logging macros.
use anyhow::Context;
use colored::Colorize; // For colored terminal output.
use serde::Deserialize; // Serde for deserializing the release API response.
use std::time::Duration;

// GitHub repository details for version checking.
const REPO_OWNER: &str = "typo3-bootstrap";
const REPO_NAME: &str = "typo3-bootstrap";
const LOCAL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code when a newer release exists.
pub const EXIT_OUTDATED: i32 = 1;
/// Exit code when the check could not reach a verdict.
pub const EXIT_INCONCLUSIVE: i32 = 2;

/// A simplified GitHub Release API response.
#[derive(Deserialize)]
struct GitHubRelease {
    tag_name: String, // The release tag name (e.g., "v1.0.0").
}

/// Outcome of comparing the local version with the latest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    Outdated { latest: String },
    Inconclusive(String),
}

impl UpdateStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            UpdateStatus::UpToDate => 0,
            UpdateStatus::Outdated { .. } => EXIT_OUTDATED,
            UpdateStatus::Inconclusive(_) => EXIT_INCONCLUSIVE,
        }
    }
}

fn releases_url() -> String {
    format!("https://api.github.com/repos/{REPO_OWNER}/{REPO_NAME}/releases/latest")
}

/// Fetches the latest release tag from `url`.
fn fetch_latest_tag(url: &str) -> anyhow::Result<String> {
    let agent = ureq::AgentBuilder::new()
        .user_agent("typo3-bootstrap-version-checker")
        .timeout(Duration::from_secs(15))
        .build();

    let response = agent.get(url).call().context("release query failed")?;
    let release: GitHubRelease = serde_json::from_reader(response.into_reader())
        .context("release response is not the expected JSON")?;
    Ok(release.tag_name)
}

/// Compares two versions, ignoring a leading `v` on either.
pub fn compare(local: &str, latest: &str) -> UpdateStatus {
    let parse = |v: &str| semver::Version::parse(v.trim().trim_start_matches('v'));
    match (parse(local), parse(latest)) {
        (Ok(local_v), Ok(latest_v)) if latest_v > local_v => UpdateStatus::Outdated {
            latest: latest_v.to_string(),
        },
        (Ok(_), Ok(_)) => UpdateStatus::UpToDate,
        (_, Err(e)) => UpdateStatus::Inconclusive(format!("cannot parse release tag '{latest}': {e}")),
        (Err(e), _) => UpdateStatus::Inconclusive(format!("cannot parse local version '{local}': {e}")),
    }
}

fn check(url: &str) -> UpdateStatus {
    match fetch_latest_tag(url) {
        Ok(tag) => compare(LOCAL_VERSION, &tag),
        Err(e) => UpdateStatus::Inconclusive(format!("{e:#}")),
    }
}

/// Runs the update check and returns the process exit code.
/// With `instructions` set (`--self-update`), also tells the operator how to upgrade.
pub fn run(instructions: bool) -> i32 {
    log_info!("Local version: {}", LOCAL_VERSION.bold());
    let status = check(&releases_url());

    match &status {
        UpdateStatus::UpToDate => log_info!("You are running the latest version."),
        UpdateStatus::Outdated { latest } => {
            log_warn!("A newer version is available: {}", latest.green());
            if instructions {
                log_info!(
                    "Download it from https://github.com/{}/{}/releases/tag/v{} and replace this binary, \
                     or run `cargo install {} --force`.",
                    REPO_OWNER,
                    REPO_NAME,
                    latest,
                    env!("CARGO_PKG_NAME")
                );
            }
        }
        UpdateStatus::Inconclusive(reason) => {
            log_error!("Could not determine the latest release: {}", reason);
        }
    }
    status.exit_code()
}
