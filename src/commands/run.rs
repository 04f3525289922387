// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg run <cmd...>`

use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::style::Color;
use tokio::process::Command;

use super::CommandContext;
use crate::cli::RunArgs;
use crate::error::{GgError, Result};
use crate::usage::CommandKind;
use crate::utils::print_colored;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// `-1` when the process was killed by a signal
    pub exit_code: i32,
    pub elapsed: Duration,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn line(&self) -> String {
        let secs = self.elapsed.as_secs_f64();
        if self.success() {
            format!("✓ Success ({:.2}s)", secs)
        } else {
            format!("❌ Exit code: {} ({:.2}s)", self.exit_code, secs)
        }
    }
}

/// `sh -c <command>` in `workdir` with inherited stdio
pub async fn run_shell(workdir: &Path, command: &str) -> Result<RunOutcome> {
    let start = Instant::now();
    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(workdir)
        .status()
        .await
        .map_err(|e| GgError::InvalidInput(format!("Failed to spawn command: {}", e)))?;

    Ok(RunOutcome {
        exit_code: status.code().unwrap_or(-1),
        elapsed: start.elapsed(),
    })
}

pub async fn execute(ctx: &CommandContext, args: &RunArgs) -> Result<()> {
    let command = args.command.join(" ");
    println!("🔄 Running: {}", command);
    println!();

    let outcome = run_shell(ctx.workdir(), &command).await?;

    println!();
    let color = if outcome.success() {
        Color::Green
    } else {
        Color::Red
    };
    print_colored(color, &outcome.line())?;

    if let Err(e) = ctx.usage().record_command(CommandKind::Run) {
        tracing::warn!("failed to record usage: {}", e);
    }
    Ok(())
}
