//! Release version check.
//!
//! Fetches the latest GitHub release tag for the distribution repository and
//! compares it against the running version. Purely informational: every
//! failure is reported as a warning and startup continues.

use crate::colors;
use crate::console::Console;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::time::Duration;

const GITHUB_API: &str = "https://api.github.com";

/// Release metadata we care about.
#[derive(Debug, Deserialize)]
pub struct Release {
    pub tag_name: String,
}

/// Compare the running version against the latest published release and
/// print the outcome. Never fails.
pub async fn check_for_updates<C: Console>(console: &mut C, repo: &str, current_version: &str) {
    match fetch_latest_release(GITHUB_API, repo).await {
        Ok(release) if release.tag_name == current_version => {
            console.print(&colors::success(&format!(
                "The version of GPR Hub CLI you are using is up to date (Version: {}).",
                current_version
            )));
        }
        Ok(release) => {
            console.print(&colors::error(&format!(
                "The version of GPR Hub CLI you are using ({}) is outdated. Please upgrade to the latest version ({}) for the best experience and new features.",
                current_version, release.tag_name
            )));
            console.print("You can do this by running the following commands in your terminal:");
            console.print("  1. brew update");
            console.print("  2. brew upgrade");
        }
        Err(err) => {
            console.print(&colors::warning(&format!(
                "Error checking for updates: {:#}",
                err
            )));
            console.print(
                "Try connecting to the internet. Other features of this CLI that require a connection may not work either.",
            );
        }
    }
}

/// GET `repos/<repo>/releases/latest` from `base`.
async fn fetch_latest_release(base: &str, repo: &str) -> Result<Release> {
    let url = format!("{}/repos/{}/releases/latest", base, repo);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(&url)
        // GitHub rejects requests without a User-Agent
        .header("User-Agent", concat!("gpr-hub/", env!("CARGO_PKG_VERSION")))
        .send()
        .await
        .context("Failed to reach the release endpoint")?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Release check failed with status {}",
            response.status()
        ));
    }

    let release: Release = response
        .json()
        .await
        .context("Failed to parse release metadata")?;
    tracing::debug!(tag = %release.tag_name, "latest release fetched");
    Ok(release)
}
