// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::Path;
use std::process::Command;

use crate::error::{GgError, Result};

const GITHUB_PREFIXES: [&str; 4] = [
    "https://github.com/",
    "http://github.com/",
    "ssh://git@github.com/",
    "git@github.com:",
];

/// `owner/repo` from a GitHub remote URL.
///
/// Accepts `https://github.com/o/r`, `http://github.com/o/r`,
/// `ssh://git@github.com/o/r` and `git@github.com:o/r`, with or without a
/// trailing `.git`.
pub fn parse_github_url(url: &str) -> Option<String> {
    let normalized = url.trim().trim_end_matches('/');
    let normalized = normalized.strip_suffix(".git").unwrap_or(normalized);

    let path = GITHUB_PREFIXES
        .iter()
        .find_map(|prefix| normalized.strip_prefix(prefix))?;

    let mut parts = path.split('/');
    let owner = parts.next()?.trim();
    let repo = parts.next()?.trim();
    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return None;
    }
    Some(format!("{}/{}", owner, repo))
}

/// Whether `s` looks like `owner/repo`
pub fn is_repo_slug(s: &str) -> bool {
    let mut parts = s.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty()
    )
}

/// Run git in `workdir`, returning trimmed stdout.
pub(crate) fn git_output(workdir: &Path, args: &[&str]) -> Result<String> {
    tracing::debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(workdir)
        .output()
        .map_err(|e| GgError::Git(format!("failed to run git {}: {}", args.join(" "), e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(GgError::Git(format!("git {} failed: {}", args.join(" "), stderr)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// `owner/repo` of the `origin` remote in `workdir`
pub fn current_repo(workdir: &Path) -> Result<String> {
    let url = git_output(workdir, &["remote", "get-url", "origin"])
        .map_err(|_| GgError::Git("Not in a git repo or no remote configured".to_string()))?;
    parse_github_url(&url)
        .ok_or_else(|| GgError::Git(format!("Could not parse GitHub repo from: {}", url)))
}
