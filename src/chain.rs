// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Saved tool chains
//!
//! A chain is an ordered list of `type:name` references (`npm:prettier`,
//! `brew:jq`, `git:owner/repo`) stored as a JSON array under
//! `~/.gg/chains/<name>.json`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::cache::DiskCache;
use crate::error::{GgError, Result};
use crate::github::api::{lookup_repo, GitHubClient};
use crate::registry::{brew::BrewCli, npm, RegistryClient, Source};

/// One `type:name` item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRef {
    pub kind: String,
    pub name: String,
}

impl ToolRef {
    /// Split at the first `:`; both sides must be non-empty
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((kind, name)) if !kind.is_empty() && !name.is_empty() => Ok(Self {
                kind: kind.to_string(),
                name: name.to_string(),
            }),
            _ => Err(GgError::InvalidInput(format!(
                "Invalid format: {} (expected type:name)",
                s
            ))),
        }
    }

    pub fn token_cost(&self) -> u32 {
        token_cost(&self.kind)
    }
}

impl fmt::Display for ToolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Approximate tokens one summary of this type costs
pub fn token_cost(kind: &str) -> u32 {
    match kind {
        "npm" => crate::registry::NPM_TOKEN_COST,
        "brew" => crate::registry::BREW_TOKEN_COST,
        "git" => 12,
        _ => 20,
    }
}

/// Chain names become file names
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GgError::InvalidInput("chain name is empty".to_string()));
    }
    if name.contains(['/', '\\', ':']) {
        return Err(GgError::InvalidInput(format!(
            "invalid chain name: {} (no '/', '\\' or ':')",
            name
        )));
    }
    Ok(())
}

/// Chains directory
#[derive(Debug, Clone)]
pub struct ChainStore {
    dir: PathBuf,
}

impl ChainStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    pub fn save(&self, name: &str, tools: &[String]) -> Result<()> {
        validate_name(name)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(name), serde_json::to_string(tools)?)?;
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Vec<String>> {
        validate_name(name)?;
        let path = self.path(name);
        if !path.exists() {
            return Err(GgError::NotFound(format!(
                "Unknown chain: {}\n   Run 'gg chain --list' to see saved chains",
                name
            )));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// `(name, tool count)` sorted by name; unreadable files are skipped
    pub fn list(&self) -> Result<Vec<(String, usize)>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut chains = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(name) {
                Ok(tools) => chains.push((name.to_string(), tools.len())),
                Err(e) => tracing::warn!("skipping chain {}: {}", path.display(), e),
            }
        }
        chains.sort();
        Ok(chains)
    }
}

/// Numbered list with per-item and combined cost
pub fn chain_lines(tools: &[String]) -> Vec<String> {
    let mut lines = vec![format!("🔗 Chained {} MCPs:", tools.len())];
    let mut total = 0;

    for (i, tool) in tools.iter().enumerate() {
        match ToolRef::parse(tool) {
            Ok(tool) => {
                let cost = tool.token_cost();
                total += cost;
                lines.push(format!("   {}. {} (~{} tokens)", i + 1, tool, cost));
            }
            Err(_) => lines.push(format!(
                "   {}. ❌ Invalid format: {} (expected type:name)",
                i + 1,
                tool
            )),
        }
    }

    lines.push(String::new());
    lines.push(format!("📊 Combined token cost: ~{}", total));
    lines
}

pub fn saved_lines(chains: &[(String, usize)]) -> Vec<String> {
    if chains.is_empty() {
        return vec![
            "📋 No saved chains".to_string(),
            "   Create one: gg chain --save <name> <tool:pkg>...".to_string(),
        ];
    }

    let mut lines = vec!["📋 Saved chains:".to_string()];
    for (name, count) in chains {
        lines.push(format!("   • {} ({} tools)", name, count));
    }
    lines
}

/// Result of checking one chain item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub ok: bool,
    pub line: String,
}

impl CheckResult {
    fn ok(line: String) -> Self {
        Self { ok: true, line }
    }

    fn failed(line: String) -> Self {
        Self { ok: false, line }
    }
}

/// Checks each item of a chain against its source
#[derive(Debug, Clone)]
pub struct ChainRunner {
    pub registry: RegistryClient,
    pub cache: DiskCache,
    pub brew: BrewCli,
    pub github: GitHubClient,
}

impl ChainRunner {
    pub async fn check(&self, tool: &ToolRef) -> CheckResult {
        match tool.kind.as_str() {
            "npm" => self.check_npm(&tool.name).await,
            "brew" => self.check_brew(&tool.name).await,
            "git" => self.check_git(&tool.name).await,
            other => CheckResult::failed(format!("   ⚠️  Unknown type: {}", other)),
        }
    }

    async fn check_npm(&self, pkg: &str) -> CheckResult {
        match npm::lookup(&self.registry, &self.cache, pkg, false).await {
            Ok(lookup) if lookup.source == Source::Cache => {
                CheckResult::ok(format!("   📦 {} ✓ (cached)", pkg))
            }
            Ok(lookup) => CheckResult::ok(format!("   📦 {}@{} ✓", pkg, lookup.summary.version)),
            Err(e) => {
                tracing::debug!("npm check {} failed: {}", pkg, e);
                CheckResult::failed(format!("   📦 {} ❌", pkg))
            }
        }
    }

    async fn check_brew(&self, formula: &str) -> CheckResult {
        match self.brew.info(formula).await {
            Some(info) => {
                let installed = crate::registry::BrewSummary::from_formula(&info).installed;
                let status = if installed { "installed" } else { "available" };
                CheckResult::ok(format!("   🍺 {} ✓ {}", formula, status))
            }
            None => CheckResult::failed(format!("   🍺 {} (not installed)", formula)),
        }
    }

    async fn check_git(&self, slug: &str) -> CheckResult {
        match lookup_repo(&self.github, &self.cache, slug, false).await {
            Ok(lookup) if lookup.cached => CheckResult::ok(format!("   🐙 {} ✓ (cached)", slug)),
            Ok(lookup) => CheckResult::ok(format!("   🐙 {} ✓ ⭐ {}", slug, lookup.summary.stars)),
            Err(e) => CheckResult::failed(format!("   🐙 {} ❌ {}", slug, e)),
        }
    }

    /// Check every item, emitting lines as they are produced; returns the
    /// number of items that passed
    pub async fn run(&self, name: &str, tools: &[String], mut emit: impl FnMut(&str)) -> usize {
        emit(&format!("🔗 Executing chain '{}'...", name));
        emit("");

        let total = tools.len();
        let mut ok = 0;
        for (i, tool) in tools.iter().enumerate() {
            let Ok(tool) = ToolRef::parse(tool) else {
                emit(&format!("[{}/{}] ❌ Invalid: {}", i + 1, total, tool));
                emit("");
                continue;
            };

            emit(&format!("[{}/{}] {}", i + 1, total, tool));
            let result = self.check(&tool).await;
            emit(&result.line);
            emit("");
            if result.ok {
                ok += 1;
            }
        }

        emit(&format!("✅ Chain complete: {}/{} tools ready", ok, total));
        ok
    }
}
