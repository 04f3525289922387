// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg .`, `gg owner/repo` and `gg maaza`

use super::{print_lines, CommandContext};
use crate::error::{GgError, Result};
use crate::github::api::{endpoint_only_lines, lookup_repo, repo_lines};
use crate::github::{current_repo, is_repo_slug, GitHubClient};

/// Summary of the repo behind `origin`
pub async fn execute_current(ctx: &CommandContext) -> Result<()> {
    let slug = current_repo(ctx.workdir())?;
    print_lines(&summary(ctx, "Current repo", &slug).await);
    Ok(())
}

/// Summary of any `owner/repo`
pub async fn execute_repo(ctx: &CommandContext, slug: &str) -> Result<()> {
    if !is_repo_slug(slug) {
        return Err(GgError::InvalidInput(format!(
            "expected owner/repo, got: {}",
            slug
        )));
    }
    print_lines(&summary(ctx, "Repo", slug).await);
    Ok(())
}

/// Repo lines, or the endpoint alone when the API cannot be used
pub async fn summary(ctx: &CommandContext, label: &str, slug: &str) -> Vec<String> {
    let settings = ctx.settings_or_default();
    let client = GitHubClient::new(&settings.registry.github_api_url);
    let endpoint = client.repo_url(slug);

    match lookup_repo(&client, &ctx.cache(), slug, false).await {
        Ok(lookup) => repo_lines(label, &lookup, &endpoint),
        Err(e) => {
            tracing::warn!("GitHub lookup for {} failed: {}", slug, e);
            endpoint_only_lines(label, slug, &endpoint)
        }
    }
}

pub fn maaza_lines() -> Vec<&'static str> {
    vec![
        "🐱 Maaza Orchestrator v1.2",
        "",
        "Model: 9.6M parameters",
        "Benchmarks: 62.9% adversarial score",
        "",
        "Code-execution MCP — 98.7% token reduction",
        "Compatible with: Claude Desktop, Cursor, any MCP client",
    ]
}
