// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg cache status|clean`

use std::time::Duration;

use super::{print_lines, CommandContext};
use crate::cache::{clean_line, status_lines};
use crate::cli::CacheCommands;
use crate::error::Result;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

pub fn execute(ctx: &CommandContext, command: &CacheCommands) -> Result<()> {
    let cache = ctx.cache();
    match command {
        CacheCommands::Status => {
            print_lines(&status_lines(&cache.status(), cache.root()));
        }
        CacheCommands::Clean { days } => {
            let max_age = Duration::from_secs(days.saturating_mul(SECS_PER_DAY));
            let report = cache.clean(max_age)?;
            tracing::debug!(
                "cache clean scanned {} removed {}",
                report.scanned,
                report.removed
            );
            println!("{}", clean_line(&report));
        }
    }
    Ok(())
}
