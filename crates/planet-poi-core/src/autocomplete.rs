// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! System-name suggestions from the Spansh API.

use crate::background::BackgroundQueue;
use anyhow::{Context, Result};
use std::time::Duration;

const SPANSH_SYSTEMS_URL: &str = "https://spansh.co.uk/api/systems";
const USER_AGENT: &str = "EDMC-PlanetPOI/1.0";
/// Shorter input matches too much to be useful.
pub const MIN_QUERY_LEN: usize = 3;
const TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of a background lookup, tagged with the text it was made for.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub query: String,
    pub suggestions: Vec<String>,
}

impl LookupResult {
    /// True when the query names a known system exactly.
    pub fn is_exact(&self) -> bool {
        self.suggestions.iter().any(|s| s == &self.query)
    }
}

#[derive(Debug, Clone)]
pub struct SystemLookup {
    base_url: String,
}

impl Default for SystemLookup {
    fn default() -> Self {
        Self::new(SPANSH_SYSTEMS_URL)
    }
}

impl SystemLookup {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Whether `input` is long enough to be worth asking about.
    pub fn accepts(input: &str) -> bool {
        input.trim().chars().count() >= MIN_QUERY_LEN
    }

    pub fn request_url(&self, input: &str) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(&self.base_url, &[("q", input.trim())])
            .context("Invalid system lookup URL")
    }

    /// Blocking query. Short input yields no suggestions without a request.
    pub fn query(&self, input: &str) -> Result<Vec<String>> {
        if !Self::accepts(input) {
            return Ok(Vec::new());
        }
        let url = self.request_url(input)?;
        log::debug!("Querying system names — url={}", url);

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;
        let names: Vec<String> = client
            .get(url)
            .send()?
            .error_for_status()?
            .json()
            .context("Unexpected system lookup response")?;
        Ok(names)
    }

    /// True when `input` is an exact system name.
    pub fn validate(&self, input: &str) -> Result<bool> {
        let input = input.trim();
        Ok(self.query(input)?.iter().any(|s| s == input))
    }

    /// Runs [`query`](Self::query) in the background. Failures are logged and
    /// reported as no suggestions.
    pub fn query_in_background(&self, input: &str, queue: &BackgroundQueue<LookupResult>) -> Result<()> {
        let lookup = self.clone();
        let query = input.trim().to_string();
        queue.spawn("system-lookup", move || {
            let suggestions = lookup.query(&query).unwrap_or_else(|e| {
                log::error!("Failed to query system from Spansh API: {:#}", e);
                Vec::new()
            });
            LookupResult { query, suggestions }
        })
    }
}
