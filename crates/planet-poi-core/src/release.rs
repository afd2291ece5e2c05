// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! Checks GitHub for a newer release. Installing it is left to the user.

use crate::background::BackgroundQueue;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

const LATEST_RELEASE_URL: &str = "https://api.github.com/repos/bbbkada/EDMC-PlanetPOI/releases/latest";
const GITHUB_API_VERSION: &str = "2022-11-28";
const TIMEOUT: Duration = Duration::from_secs(10);

/// Version of this build.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseStatus {
    UpToDate,
    /// Running something newer than the latest release, e.g. a dev build.
    Ahead,
    Available(ReleaseInfo),
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^v*(\d+)\.(\d+)\.(\d+)$").unwrap())
}

/// `"v1.4.2"` as `1_004_002`. Anything not shaped like that is 0.
pub fn version_number(version: &str) -> u64 {
    let Some(caps) = version_regex().captures(version.trim()) else {
        log::error!("Failed to parse version: {}", version);
        return 0;
    };
    let part = |i: usize| caps[i].parse::<u64>().unwrap_or(0);
    part(1) * 1_000_000 + part(2) * 1_000 + part(3)
}

pub fn compare(current: &str, latest: ReleaseInfo) -> ReleaseStatus {
    let current_n = version_number(current);
    let latest_n = version_number(&latest.tag_name);
    log::debug!(
        "Release comparison — current={} ({}) latest={} ({})",
        current,
        current_n,
        latest.tag_name,
        latest_n
    );
    match current_n.cmp(&latest_n) {
        std::cmp::Ordering::Equal => ReleaseStatus::UpToDate,
        std::cmp::Ordering::Greater => ReleaseStatus::Ahead,
        std::cmp::Ordering::Less => {
            log::info!("New version available: {}", latest.tag_name);
            ReleaseStatus::Available(latest)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReleaseChecker {
    url: String,
    current: String,
}

impl Default for ReleaseChecker {
    fn default() -> Self {
        Self::new(LATEST_RELEASE_URL, CURRENT_VERSION)
    }
}

impl ReleaseChecker {
    pub fn new(url: impl Into<String>, current: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            current: current.into(),
        }
    }

    pub fn fetch_latest(&self) -> Result<ReleaseInfo> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("EDMC-PlanetPOI.{}", CURRENT_VERSION))
            .timeout(TIMEOUT)
            .build()?;
        client
            .get(&self.url)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()?
            .error_for_status()?
            .json()
            .context("Unexpected release metadata")
    }

    pub fn check(&self) -> Result<ReleaseStatus> {
        Ok(compare(&self.current, self.fetch_latest()?))
    }

    /// Runs [`check`](Self::check) in the background. A failed check reads
    /// as up to date.
    pub fn check_in_background(&self, queue: &BackgroundQueue<ReleaseStatus>) -> Result<()> {
        let checker = self.clone();
        queue.spawn("release-check", move || {
            checker.check().unwrap_or_else(|e| {
                log::error!("Failed to fetch release info: {:#}", e);
                ReleaseStatus::UpToDate
            })
        })
    }
}
