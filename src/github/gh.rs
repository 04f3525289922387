// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Wrapper over the `gh` CLI
//!
//! Authentication is whatever session `gh auth login` established; gg never
//! handles GitHub credentials for PR operations itself.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;

use crate::error::{GgError, Result};
use crate::utils::truncate;

const PR_VIEW_FIELDS: &str =
    "number,title,author,state,body,additions,deletions,changedFiles,headRefName,baseRefName,url";

/// Output of `gh pr view --json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrView {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub author: PrAuthor,
    pub state: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub head_ref_name: String,
    #[serde(default)]
    pub base_ref_name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PrAuthor {
    #[serde(default)]
    pub login: String,
}

/// One entry of `gh pr list --json number,title,headRefName`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrListItem {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub head_ref_name: String,
}

impl PrView {
    pub fn is_open(&self) -> bool {
        self.state == "OPEN"
    }
}

/// Choice from the `gg pr` action menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrAction {
    Approve,
    Diff,
    Close,
    Quit,
}

impl PrAction {
    /// Anything unrecognized quits
    pub fn parse(choice: &str) -> Self {
        match choice.trim().to_lowercase().as_str() {
            "a" | "approve" => PrAction::Approve,
            "d" | "diff" => PrAction::Diff,
            "c" | "close" => PrAction::Close,
            _ => PrAction::Quit,
        }
    }
}

/// The `gh` binary, run in a working directory
#[derive(Debug, Clone)]
pub struct GhCli {
    program: OsString,
    workdir: PathBuf,
}

impl GhCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self::with_program("gh", workdir)
    }

    pub fn with_program(program: impl Into<OsString>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn command(&self, args: &[&str]) -> Command {
        tracing::debug!("gh {}", args.join(" "));
        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(&self.workdir);
        cmd
    }

    fn output(&self, args: &[&str]) -> Result<String> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| GgError::GitHub(format!("failed to run gh: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GgError::GitHub(format!(
                "gh {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_inherited(&self, args: &[&str]) -> Result<()> {
        let status = self
            .command(args)
            .status()
            .map_err(|e| GgError::GitHub(format!("failed to run gh: {}", e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(GgError::GitHub(format!(
                "gh {} exited with {}",
                args.join(" "),
                status
            )))
        }
    }

    /// `gh auth status` reports a logged-in account
    pub fn auth_status(&self) -> bool {
        self.command(&["auth", "status"])
            .stdin(Stdio::null())
            .output()
            .map(|out| {
                let mut text = String::from_utf8_lossy(&out.stdout).to_string();
                text.push_str(&String::from_utf8_lossy(&out.stderr));
                out.status.success() && text.contains("Logged in")
            })
            .unwrap_or(false)
    }

    pub fn ensure_auth(&self) -> Result<()> {
        if self.auth_status() {
            return Ok(());
        }
        Err(GgError::GitHub(
            "GitHub authentication required\n\nRun: gh auth login\nOr install gh CLI: https://cli.github.com"
                .to_string(),
        ))
    }

    pub fn pr_view(&self, number: u64) -> Result<PrView> {
        let n = number.to_string();
        let json = self.output(&["pr", "view", &n, "--json", PR_VIEW_FIELDS])?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Most recent PR, if any
    pub fn pr_list_latest(&self) -> Result<Option<PrListItem>> {
        let json = self.output(&[
            "pr",
            "list",
            "--limit",
            "1",
            "--json",
            "number,title,headRefName",
        ])?;
        let prs: Vec<PrListItem> = serde_json::from_str(&json)?;
        Ok(prs.into_iter().next())
    }

    pub fn pr_merge(&self, number: u64) -> Result<()> {
        let n = number.to_string();
        self.run_inherited(&["pr", "merge", &n, "--squash", "--delete-branch"])
    }

    pub fn pr_diff(&self, number: u64) -> Result<()> {
        let n = number.to_string();
        self.run_inherited(&["pr", "diff", &n])
    }

    pub fn pr_close(&self, number: u64) -> Result<()> {
        let n = number.to_string();
        self.run_inherited(&["pr", "close", &n])
    }

    /// Open a PR from the current branch against `base`, returning its URL
    pub fn pr_create(&self, title: &str, body: &str, base: &str) -> Result<String> {
        let out = self.output(&[
            "pr", "create", "--title", title, "--body", body, "--base", base,
        ])?;
        out.lines()
            .rev()
            .map(str::trim)
            .find(|l| l.starts_with("http"))
            .map(String::from)
            .ok_or_else(|| GgError::GitHub("gh pr create printed no URL".to_string()))
    }
}

/// Lines printed by `gg pr <n>`
pub fn pr_lines(pr: &PrView) -> Vec<String> {
    let mut lines = vec![
        format!("PR #{}: {}", pr.number, pr.title),
        format!("Author: {} | State: {}", pr.author.login, pr.state),
        format!("Branch: {} → {}", pr.head_ref_name, pr.base_ref_name),
        format!(
            "Changes: +{} -{} ({} files)",
            pr.additions, pr.deletions, pr.changed_files
        ),
        String::new(),
    ];

    if !pr.body.is_empty() {
        lines.push("Description:".to_string());
        lines.push(truncate(&pr.body, 500));
        lines.push(String::new());
    }

    lines.push(format!("URL: {}", pr.url));
    lines
}

/// The action menu shown for open PRs
pub fn action_menu_lines() -> Vec<String> {
    vec![
        "Actions:".to_string(),
        "  [a]pprove - Merge this PR".to_string(),
        "  [d]iff   - Show full diff".to_string(),
        "  [c]lose  - Close without merging".to_string(),
        "  [q]uit   - Exit".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW_JSON: &str = r#"{
        "number": 42,
        "title": "gg ask: add health endpoint",
        "author": {"login": "octocat"},
        "state": "OPEN",
        "body": "Generated by gg ask:\n\nadd health endpoint",
        "additions": 30,
        "deletions": 2,
        "changedFiles": 3,
        "headRefName": "gg-ask-1700000000",
        "baseRefName": "main",
        "url": "https://github.com/o/r/pull/42"
    }"#;

    #[test]
    fn test_pr_view_deserializes() {
        let pr: PrView = serde_json::from_str(VIEW_JSON).unwrap();
        assert_eq!(pr.number, 42);
        assert_eq!(pr.author.login, "octocat");
        assert_eq!(pr.changed_files, 3);
        assert!(pr.is_open());
    }

    #[test]
    fn test_pr_lines() {
        let pr: PrView = serde_json::from_str(VIEW_JSON).unwrap();
        let lines = pr_lines(&pr);
        assert_eq!(lines[0], "PR #42: gg ask: add health endpoint");
        assert_eq!(lines[1], "Author: octocat | State: OPEN");
        assert_eq!(lines[2], "Branch: gg-ask-1700000000 → main");
        assert_eq!(lines[3], "Changes: +30 -2 (3 files)");
        assert!(lines.contains(&"Description:".to_string()));
        assert_eq!(lines.last().unwrap(), "URL: https://github.com/o/r/pull/42");
    }

    #[test]
    fn test_pr_lines_truncates_body() {
        let pr = PrView {
            body: "x".repeat(800),
            ..PrView::default()
        };
        let lines = pr_lines(&pr);
        let body = lines.iter().find(|l| l.starts_with('x')).unwrap();
        assert_eq!(body.chars().count(), 503);
    }

    #[test]
    fn test_pr_lines_without_body() {
        let lines = pr_lines(&PrView::default());
        assert!(!lines.contains(&"Description:".to_string()));
    }

    #[test]
    fn test_pr_action_parse() {
        assert_eq!(PrAction::parse("a"), PrAction::Approve);
        assert_eq!(PrAction::parse(" D\n"), PrAction::Diff);
        assert_eq!(PrAction::parse("c"), PrAction::Close);
        assert_eq!(PrAction::parse(""), PrAction::Quit);
        assert_eq!(PrAction::parse("x"), PrAction::Quit);
    }

    #[test]
    fn test_pr_list_item() {
        let prs: Vec<PrListItem> =
            serde_json::from_str(r#"[{"number":7,"title":"t","headRefName":"gg-ask-1"}]"#).unwrap();
        assert_eq!(prs[0].head_ref_name, "gg-ask-1");
    }

    #[test]
    fn test_missing_gh_binary() {
        let dir = tempfile::tempdir().unwrap();
        let gh = GhCli::with_program("/nonexistent/bin/gh", dir.path());
        assert!(!gh.auth_status());
        let err = gh.ensure_auth().unwrap_err();
        assert!(err.to_string().contains("gh auth login"));
        assert!(gh.pr_view(1).is_err());
    }
}
