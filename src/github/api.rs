// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::cache::{DiskCache, Namespace};
use crate::error::{GgError, Result};

const USER_AGENT: &str = concat!("gg/", env!("CARGO_PKG_VERSION"));

/// Client for the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Uses `GITHUB_TOKEN` when set
    pub fn new(base_url: impl Into<String>) -> Self {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self::with_token(base_url, token)
    }

    pub fn with_token(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// API URL of a repository
    pub fn repo_url(&self, slug: &str) -> String {
        format!("{}/repos/{}", self.base_url, slug)
    }

    /// `GET /repos/{owner}/{repo}`
    pub async fn repo(&self, slug: &str) -> Result<Value> {
        let mut request = self
            .client
            .get(self.repo_url(slug))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GgError::NotFound(format!("Repository not found: {}", slug)));
        }
        if !status.is_success() {
            return Err(GgError::GitHub(format!(
                "GitHub API error: {}",
                status.as_u16()
            )));
        }
        Ok(response.json().await?)
    }
}

/// The fields of a repository worth showing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "stargazers_count")]
    pub stars: u64,
    #[serde(default, rename = "forks_count")]
    pub forks: u64,
    #[serde(default, rename = "open_issues_count")]
    pub open_issues: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default)]
    pub pushed_at: Option<String>,
}

impl RepoSummary {
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(RepoSummary::deserialize(value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLookup {
    pub summary: RepoSummary,
    pub cached: bool,
}

/// Cached repo metadata, fetched on a miss
pub async fn lookup_repo(
    client: &GitHubClient,
    cache: &DiskCache,
    slug: &str,
    refresh: bool,
) -> Result<RepoLookup> {
    if !refresh {
        if let Some(value) = cache.get(Namespace::GitHub, slug) {
            if let Ok(summary) = RepoSummary::from_json(&value) {
                return Ok(RepoLookup {
                    summary,
                    cached: true,
                });
            }
        }
    }

    let value = client.repo(slug).await?;
    let summary = RepoSummary::from_json(&value)?;
    if let Err(e) = cache.put(Namespace::GitHub, slug, &value) {
        tracing::warn!("failed to cache github:{}: {}", slug, e);
    }
    Ok(RepoLookup {
        summary,
        cached: false,
    })
}

/// Lines for a repo whose metadata was fetched
pub fn repo_lines(label: &str, lookup: &RepoLookup, endpoint: &str) -> Vec<String> {
    let summary = &lookup.summary;
    let mut header = format!("📦 {}: {}", label, summary.full_name);
    if lookup.cached {
        header.push_str(" (cached)");
    }

    let mut lines = vec![header];
    if let Some(description) = summary.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("   {}", description));
    }
    lines.push(format!(
        "   ⭐ {} | forks: {} | open issues: {}",
        summary.stars, summary.forks, summary.open_issues
    ));

    let mut meta = Vec::new();
    if let Some(language) = &summary.language {
        meta.push(format!("lang: {}", language));
    }
    if !summary.default_branch.is_empty() {
        meta.push(format!("branch: {}", summary.default_branch));
    }
    if let Some(pushed) = &summary.pushed_at {
        meta.push(format!("pushed: {}", pushed));
    }
    if !meta.is_empty() {
        lines.push(format!("   {}", meta.join(" | ")));
    }

    lines.push(String::new());
    lines.extend(endpoint_lines(endpoint));
    lines
}

/// Lines when only the endpoint is known
pub fn endpoint_only_lines(label: &str, slug: &str, endpoint: &str) -> Vec<String> {
    let mut lines = vec![format!("📦 {}: {}", label, slug), String::new()];
    lines.extend(endpoint_lines(endpoint));
    lines
}

fn endpoint_lines(endpoint: &str) -> Vec<String> {
    vec![
        "MCP endpoint:".to_string(),
        format!("  {}", endpoint),
        String::new(),
        "Code-execution MCP active".to_string(),
    ]
}
