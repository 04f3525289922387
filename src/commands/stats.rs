// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg stats`

use super::{print_lines, CommandContext};
use crate::usage::stats_lines;

pub fn execute(ctx: &CommandContext) {
    let stats = ctx.usage().load();
    print_lines(&stats_lines(stats.as_ref()));
}
