// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg approve` and `gg pr <n>`

use std::io::{self, BufRead};

use crossterm::style::Color;

use super::{print_lines, CommandContext};
use crate::cli::{ApproveArgs, PrArgs};
use crate::error::{GgError, Result};
use crate::github::gh::{action_menu_lines, pr_lines};
use crate::github::{current_repo, GhCli, PrAction, PrListItem};
use crate::utils::{is_affirmative, print_colored, prompt_line};

pub fn execute_approve(ctx: &CommandContext, args: &ApproveArgs) -> Result<()> {
    let gh = GhCli::new(ctx.workdir());
    gh.ensure_auth()?;

    let Some(pr) = gh.pr_list_latest()? else {
        println!("No open PRs found");
        return Ok(());
    };

    let stdin = io::stdin();
    approve(&gh, &pr, args.yes, &mut stdin.lock())
}

/// Confirm (unless `yes`) and squash-merge `pr`
pub fn approve<R: BufRead>(gh: &GhCli, pr: &PrListItem, yes: bool, input: &mut R) -> Result<()> {
    print_lines(&approve_lines(pr));

    if !yes {
        let answer = prompt_line(input, "Merge this PR? [Y/n]: ")?;
        if !is_affirmative(&answer) {
            println!("Cancelled");
            return Ok(());
        }
    }

    gh.pr_merge(pr.number)?;
    println!();
    print_colored(Color::Green, "✓ PR merged successfully!")
}

pub fn approve_lines(pr: &PrListItem) -> Vec<String> {
    vec![
        format!("PR #{}: {}", pr.number, pr.title),
        format!("Branch: {}", pr.head_ref_name),
        String::new(),
    ]
}

pub fn execute_pr(ctx: &CommandContext, args: &PrArgs) -> Result<()> {
    let gh = GhCli::new(ctx.workdir());
    gh.ensure_auth()?;
    current_repo(ctx.workdir())
        .map_err(|_| GgError::NotFound("Not in a git repository".to_string()))?;

    let pr = gh.pr_view(args.number)?;
    print_lines(&pr_lines(&pr));
    println!();

    if !pr.is_open() {
        return Ok(());
    }

    print_lines(&action_menu_lines());
    let stdin = io::stdin();
    let choice = prompt_line(&mut stdin.lock(), "\nChoice: ")?;
    match PrAction::parse(&choice) {
        PrAction::Approve => {
            gh.pr_merge(pr.number)?;
            print_colored(Color::Green, "✓ PR merged!")?;
        }
        PrAction::Diff => gh.pr_diff(pr.number)?,
        PrAction::Close => {
            gh.pr_close(pr.number)?;
            print_colored(Color::Green, "✓ PR closed")?;
        }
        PrAction::Quit => println!("Exiting"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> PrListItem {
        PrListItem {
            number: 7,
            title: "gg ask: add health".to_string(),
            head_ref_name: "gg-ask-1".to_string(),
        }
    }

    #[test]
    fn test_approve_lines() {
        assert_eq!(
            approve_lines(&item()),
            vec!["PR #7: gg ask: add health", "Branch: gg-ask-1", ""]
        );
    }

    #[test]
    fn test_declined_approval_does_not_merge() {
        let dir = tempfile::tempdir().unwrap();
        let gh = GhCli::with_program("/nonexistent/bin/gh", dir.path());
        let mut input = io::Cursor::new(b"n\n".to_vec());
        assert!(approve(&gh, &item(), false, &mut input).is_ok());
    }

    #[test]
    fn test_accepted_approval_runs_merge() {
        let dir = tempfile::tempdir().unwrap();
        let gh = GhCli::with_program("/nonexistent/bin/gh", dir.path());
        let mut input = io::Cursor::new(b"\n".to_vec());
        let err = approve(&gh, &item(), false, &mut input).unwrap_err();
        assert!(err.to_string().contains("failed to run gh"));
    }
}
