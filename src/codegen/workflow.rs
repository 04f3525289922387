// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Branch, commit, push and PR for generated changes

use std::path::{Path, PathBuf};

use super::{apply_files, CodeFile, FileOutcome};
use crate::error::Result;
use crate::github::remote::git_output;
use crate::github::GhCli;
use crate::utils::truncate;

/// Which handler produced the change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Ask { prompt: String },
    Edit { path: String, instruction: String },
}

impl ChangeKind {
    /// `gg-ask-<unix>` / `gg-edit-<unix>`
    pub fn branch_name(&self, unix_secs: i64) -> String {
        match self {
            ChangeKind::Ask { .. } => format!("gg-ask-{}", unix_secs),
            ChangeKind::Edit { .. } => format!("gg-edit-{}", unix_secs),
        }
    }

    /// Also used as the PR title
    pub fn commit_message(&self) -> String {
        match self {
            ChangeKind::Ask { prompt } => format!("gg ask: {}", truncate(prompt, 60)),
            ChangeKind::Edit { path, instruction } => {
                format!("gg edit {}: {}", path, truncate(instruction, 60))
            }
        }
    }

    pub fn pr_body(&self) -> String {
        match self {
            ChangeKind::Ask { prompt } => format!("Generated by gg ask:\n\n{}", prompt),
            ChangeKind::Edit { path, instruction } => {
                format!("Generated by gg edit on `{}`:\n\n{}", path, instruction)
            }
        }
    }
}

/// How the change ended up on GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Created { url: String },
    /// Push or PR creation failed; the branch exists locally
    Manual { branch: String, reason: String },
}

/// Git operations in a working tree
#[derive(Debug, Clone)]
pub struct GitWorkflow {
    workdir: PathBuf,
}

impl GitWorkflow {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn create_branch(&self, name: &str) -> Result<()> {
        git_output(&self.workdir, &["checkout", "-b", name]).map(|_| ())
    }

    pub fn current_branch(&self) -> Result<String> {
        git_output(&self.workdir, &["symbolic-ref", "--short", "HEAD"])
    }

    /// Check out `previous` again and delete `branch`
    pub fn abandon_branch(&self, branch: &str, previous: &str) -> Result<()> {
        git_output(&self.workdir, &["checkout", "-q", previous])?;
        git_output(&self.workdir, &["branch", "-D", branch]).map(|_| ())
    }

    /// Create `branch` and write `files` on it. When no file could be written
    /// the previous branch is restored and `branch` deleted; the outcomes are
    /// returned either way.
    pub fn write_on_branch(&self, branch: &str, files: &[CodeFile]) -> Result<Vec<FileOutcome>> {
        let previous = self.current_branch().ok();
        self.create_branch(branch)?;

        let outcomes = apply_files(&self.workdir, files);
        if outcomes.iter().any(FileOutcome::is_written) {
            return Ok(outcomes);
        }

        match previous {
            Some(previous) => {
                if let Err(e) = self.abandon_branch(branch, &previous) {
                    tracing::warn!("could not return to {}: {}", previous, e);
                }
            }
            None => tracing::warn!("no previous branch to return to from {}", branch),
        }
        Ok(outcomes)
    }

    /// Stage everything and commit
    pub fn commit_all(&self, message: &str) -> Result<()> {
        git_output(&self.workdir, &["add", "."])?;
        git_output(&self.workdir, &["commit", "-m", message]).map(|_| ())
    }

    pub fn push(&self, branch: &str) -> Result<()> {
        git_output(&self.workdir, &["push", "-u", "origin", branch]).map(|_| ())
    }

    /// Push the branch and open a PR against `base`; failures here leave a
    /// usable local branch
    pub fn publish(
        &self,
        gh: &GhCli,
        branch: &str,
        base: &str,
        kind: &ChangeKind,
    ) -> PublishOutcome {
        if let Err(e) = self.push(branch) {
            tracing::warn!("push failed: {}", e);
            return PublishOutcome::Manual {
                branch: branch.to_string(),
                reason: e.to_string(),
            };
        }

        match gh.pr_create(&kind.commit_message(), &kind.pr_body(), base) {
            Ok(url) => PublishOutcome::Created { url },
            Err(e) => {
                tracing::warn!("gh pr create failed: {}", e);
                PublishOutcome::Manual {
                    branch: branch.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// System prompt for code generation in `repo`
pub fn system_prompt(repo: &str) -> String {
    format!(
        "You are a code generation assistant for the repository: {}\n\n\
         Generate clean, production-ready code based on the user's request.\n\
         Format code blocks as:\n\
         ```language:path/to/file\n\
         code here\n\
         ```\n\n\
         Be concise and only generate the requested code.",
        repo
    )
}

/// Prompt sent by `gg edit`
pub fn edit_prompt(path: &str, content: &str, instruction: &str) -> String {
    format!(
        "Edit the file `{path}` according to this instruction:\n{instruction}\n\n\
         Current content of {path}:\n```\n{content}\n```\n\n\
         Reply with the complete new file as a single block fenced as ```language:{path}",
    )
}
