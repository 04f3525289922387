// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Curated tool collections for `gg cool`

use crate::chain::ToolRef;
use crate::error::{GgError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toolbelt {
    pub name: &'static str,
    pub tools: &'static [&'static str],
}

pub const TOOLBELTS: [Toolbelt; 5] = [
    Toolbelt {
        name: "webdev",
        tools: &[
            "npm:eslint",
            "npm:prettier",
            "npm:typescript",
            "npm:jest",
            "npm:playwright",
        ],
    },
    Toolbelt {
        name: "media",
        tools: &["brew:ffmpeg", "brew:imagemagick", "brew:exiftool"],
    },
    Toolbelt {
        name: "sec",
        tools: &["brew:semgrep", "npm:snyk", "brew:trivy"],
    },
    Toolbelt {
        name: "data",
        tools: &["brew:duckdb", "brew:jq", "npm:csvtojson"],
    },
    Toolbelt {
        name: "devops",
        tools: &["brew:terraform", "brew:kubectl", "brew:docker"],
    },
];

pub fn find(name: &str) -> Result<&'static Toolbelt> {
    TOOLBELTS.iter().find(|t| t.name == name).ok_or_else(|| {
        GgError::NotFound(format!(
            "Unknown toolbelt: {}\n   Run 'gg cool --list' to see available toolbelts",
            name
        ))
    })
}

impl Toolbelt {
    fn refs(&self) -> impl Iterator<Item = ToolRef> + '_ {
        self.tools.iter().filter_map(|t| ToolRef::parse(t).ok())
    }

    pub fn token_cost(&self) -> u32 {
        self.refs().map(|t| t.token_cost()).sum()
    }

    /// Lines printed by `gg cool <name>`
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("🧰 Toolbelt: {}", self.name), String::new()];
        for tool in self.refs() {
            lines.push(format!("   • {} ({})", tool.name, tool.kind));
        }
        lines.push(String::new());
        lines.push(format!("📊 Combined token cost: ~{}", self.token_cost()));
        lines.push(String::new());
        lines.push(format!("💡 Chain all: gg chain {}", self.tools.join(" ")));
        lines
    }
}

/// Lines printed by `gg cool --list`
pub fn list_lines() -> Vec<String> {
    let mut lines = vec!["🧰 Available toolbelts:".to_string(), String::new()];
    for belt in &TOOLBELTS {
        lines.push(format!("   {} ({} tools)", belt.name, belt.tools.len()));
        for tool in belt.refs() {
            lines.push(format!("      • {} ({})", tool.name, tool.kind));
        }
        lines.push(String::new());
    }
    lines
}

pub fn names() -> String {
    TOOLBELTS
        .iter()
        .map(|t| t.name)
        .collect::<Vec<_>>()
        .join(", ")
}
