// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use serde_json::Value;

use super::{str_field, RegistryClient, Source, NPM_TOKEN_COST};
use crate::cache::{DiskCache, Namespace};
use crate::error::Result;

/// The fields of an npm manifest worth showing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NpmSummary {
    pub name: String,
    pub version: String,
    pub description: String,
    pub license: Option<String>,
    pub dependency_count: Option<usize>,
}

impl NpmSummary {
    pub fn from_manifest(manifest: &Value) -> Self {
        // Old manifests use {"type": "MIT"} instead of a plain string
        let license = match manifest.get("license") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(o)) => o.get("type").and_then(Value::as_str).map(String::from),
            _ => None,
        };

        Self {
            name: str_field(manifest, "name").to_string(),
            version: str_field(manifest, "version").to_string(),
            description: str_field(manifest, "description").to_string(),
            license,
            dependency_count: manifest
                .get("dependencies")
                .and_then(Value::as_object)
                .map(|deps| deps.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmLookup {
    pub package: String,
    pub summary: NpmSummary,
    pub source: Source,
}

/// Cache first unless `refresh`, otherwise fetch and store.
pub async fn lookup(
    client: &RegistryClient,
    cache: &DiskCache,
    pkg: &str,
    refresh: bool,
) -> Result<NpmLookup> {
    if !refresh {
        if let Some(manifest) = cache.get(Namespace::Npm, pkg) {
            return Ok(NpmLookup {
                package: pkg.to_string(),
                summary: NpmSummary::from_manifest(&manifest),
                source: Source::Cache,
            });
        }
    }

    let manifest = client.npm_latest(pkg).await?;
    if let Err(e) = cache.put(Namespace::Npm, pkg, &manifest) {
        tracing::warn!("failed to cache npm:{}: {}", pkg, e);
    }

    Ok(NpmLookup {
        package: pkg.to_string(),
        summary: NpmSummary::from_manifest(&manifest),
        source: Source::Remote,
    })
}

/// Lines printed by `gg npm`
pub fn summary_lines(lookup: &NpmLookup, function: Option<&str>) -> Vec<String> {
    let summary = &lookup.summary;
    let mut lines = vec![match lookup.source {
        Source::Cache => format!("📦 {} (cached)", lookup.package),
        _ => format!("📦 Fetching {} from npm...", lookup.package),
    }];

    lines.push(String::new());
    lines.push(format!("📦 {}@{}", summary.name, summary.version));
    if !summary.description.is_empty() {
        lines.push(format!("   {}", summary.description));
    }

    let mut meta = Vec::new();
    if let Some(license) = &summary.license {
        meta.push(format!("license: {}", license));
    }
    if let Some(deps) = summary.dependency_count {
        meta.push(format!("deps: {}", deps));
    }
    if !meta.is_empty() {
        lines.push(format!("   {}", meta.join(" | ")));
    }

    if let Some(function) = function {
        lines.push(String::new());
        lines.push(format!("🎯 Function: {}", function));
    }

    lines.push(String::new());
    lines.push(format!("🔌 MCP Endpoint: npm:{}", summary.name));
    lines.push(format!("   Token cost: ~{}", NPM_TOKEN_COST));
    lines
}
