// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Monthly usage counters kept in `stats.json`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::llm::{ModelPricing, Usage};

/// Commands that are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ask,
    Edit,
    A2a,
    Run,
}

/// Counters for one calendar month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// `YYYY-MM`
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub ask_count: u64,
    #[serde(default)]
    pub run_count: u64,
    #[serde(default)]
    pub edit_count: u64,
    #[serde(default)]
    pub a2a_count: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub estimated_cost: f64,
}

impl UsageStats {
    /// Reset every counter when `month` differs from the stored one
    pub fn roll_over(&mut self, month: &str) {
        if self.month != month {
            *self = UsageStats {
                month: month.to_string(),
                ..Default::default()
            };
        }
    }

    pub fn count(&mut self, kind: CommandKind) {
        match kind {
            CommandKind::Ask => self.ask_count += 1,
            CommandKind::Edit => self.edit_count += 1,
            CommandKind::A2a => self.a2a_count += 1,
            CommandKind::Run => self.run_count += 1,
        }
    }

    /// Add tokens priced with the model that produced them
    pub fn add_tokens(&mut self, usage: &Usage, pricing: &ModelPricing) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
        self.total_tokens = self.input_tokens + self.output_tokens;
        self.estimated_cost += pricing.cost(usage);
    }
}

/// Current month as `YYYY-MM` in local time
pub fn current_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

/// Reads and writes `stats.json`
#[derive(Debug, Clone)]
pub struct UsageStore {
    path: PathBuf,
}

impl UsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when there is no stats file or it cannot be parsed
    pub fn load(&self) -> Option<UsageStats> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!("ignoring corrupt {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, stats: &UsageStats) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(stats)?)?;
        Ok(())
    }

    pub fn record_command(&self, kind: CommandKind) -> Result<UsageStats> {
        self.update(&current_month(), |stats| stats.count(kind))
    }

    pub fn record_tokens(&self, usage: &Usage, pricing: &ModelPricing) -> Result<UsageStats> {
        self.update(&current_month(), |stats| stats.add_tokens(usage, pricing))
    }

    fn update(&self, month: &str, apply: impl FnOnce(&mut UsageStats)) -> Result<UsageStats> {
        let mut stats = self.load().unwrap_or_default();
        stats.roll_over(month);
        apply(&mut stats);
        self.save(&stats)?;
        Ok(stats)
    }
}

/// Lines printed by `gg stats`
pub fn stats_lines(stats: Option<&UsageStats>) -> Vec<String> {
    let mut lines = vec!["📊 Usage Statistics".to_string(), String::new()];

    let Some(stats) = stats else {
        lines.push("No usage data yet. Run some commands first!".to_string());
        return lines;
    };

    lines.push(format!("Month: {}", stats.month));
    lines.push(format!("Total asks: {}", stats.ask_count));
    lines.push(format!("Total edits: {}", stats.edit_count));
    lines.push(format!("Total a2a: {}", stats.a2a_count));
    lines.push(format!("Total runs: {}", stats.run_count));
    lines.push(format!(
        "Total tokens: {} (input: {}, output: {})",
        stats.total_tokens, stats.input_tokens, stats.output_tokens
    ));
    lines.push(format!("Estimated cost: ${:.4}", stats.estimated_cost));
    lines
}
