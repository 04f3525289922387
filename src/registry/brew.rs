// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::ffi::OsString;
use std::process::Stdio;

use serde_json::Value;
use tokio::process::Command;

use super::{str_field, RegistryClient, Source, BREW_TOKEN_COST};
use crate::cache::{DiskCache, Namespace};
use crate::error::{GgError, Result};

/// The local `brew` binary
#[derive(Debug, Clone)]
pub struct BrewCli {
    program: OsString,
}

impl Default for BrewCli {
    fn default() -> Self {
        Self::new("brew")
    }
}

impl BrewCli {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `formulae[0]` of `brew info <formula> --json=v2`, or `None` when brew
    /// is missing, fails, or knows no such formula
    pub async fn info(&self, formula: &str) -> Option<Value> {
        let output = Command::new(&self.program)
            .args(["info", formula, "--json=v2"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            tracing::debug!("brew info {} exited with {}", formula, output.status);
            return None;
        }

        let parsed: Value = serde_json::from_slice(&output.stdout).ok()?;
        parsed.get("formulae")?.as_array()?.first().cloned()
    }

    /// `brew install <formula>` with inherited output
    pub async fn install(&self, formula: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .args(["install", formula])
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(GgError::Registry(format!(
                "Install failed: brew install {} exited with {}",
                formula, status
            )))
        }
    }
}

/// The fields of a formula worth showing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrewSummary {
    pub name: String,
    pub version: String,
    pub description: String,
    pub installed: bool,
}

impl BrewSummary {
    pub fn from_formula(formula: &Value) -> Self {
        let version = formula
            .get("versions")
            .and_then(|v| v.get("stable"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        // `installed` is an empty array for formulas brew knows but has not installed
        let installed = formula
            .get("installed")
            .and_then(Value::as_array)
            .is_some_and(|versions| !versions.is_empty());

        Self {
            name: str_field(formula, "name").to_string(),
            version,
            description: str_field(formula, "desc").to_string(),
            installed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrewLookup {
    pub formula: String,
    pub summary: BrewSummary,
    pub source: Source,
}

/// Local brew first, then the cache unless `refresh`, then the formulae API.
pub async fn lookup(
    cli: &BrewCli,
    client: &RegistryClient,
    cache: &DiskCache,
    formula: &str,
    refresh: bool,
) -> Result<BrewLookup> {
    if let Some(info) = cli.info(formula).await {
        return Ok(BrewLookup {
            formula: formula.to_string(),
            summary: BrewSummary::from_formula(&info),
            source: Source::Local,
        });
    }

    if !refresh {
        if let Some(info) = cache.get(Namespace::Brew, formula) {
            return Ok(BrewLookup {
                formula: formula.to_string(),
                summary: BrewSummary::from_formula(&info),
                source: Source::Cache,
            });
        }
    }

    let info = client.brew_formula(formula).await?;
    if let Err(e) = cache.put(Namespace::Brew, formula, &info) {
        tracing::warn!("failed to cache brew:{}: {}", formula, e);
    }

    Ok(BrewLookup {
        formula: formula.to_string(),
        summary: BrewSummary::from_formula(&info),
        source: Source::Remote,
    })
}

/// Lines printed by `gg brew`
pub fn summary_lines(lookup: &BrewLookup, auto_install: bool) -> Vec<String> {
    let summary = &lookup.summary;
    let mut lines = Vec::new();

    match lookup.source {
        Source::Cache => lines.push(format!("🍺 {} (cached)", lookup.formula)),
        Source::Remote => lines.push(format!("🍺 Fetching {} from Homebrew...", lookup.formula)),
        Source::Local => {}
    }

    let status = if summary.installed {
        "✓ installed"
    } else {
        "not installed"
    };
    lines.push(String::new());
    lines.push(format!("🍺 {}@{} ({})", summary.name, summary.version, status));
    if !summary.description.is_empty() {
        lines.push(format!("   {}", summary.description));
    }

    if !summary.installed && !auto_install {
        lines.push(String::new());
        lines.push(format!("   Install: brew install {}", lookup.formula));
        lines.push(format!("   Or use: gg brew -i {}", lookup.formula));
    }

    lines.push(String::new());
    lines.push(format!("🔌 MCP Endpoint: brew:{}", lookup.formula));
    lines.push(format!("   Token cost: ~{}", BREW_TOKEN_COST));
    lines
}
