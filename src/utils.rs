// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Utility functions for gg
//!
//! Pure text and filesystem helpers shared by the command handlers.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::LazyLock;

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};
use regex::Regex;

use crate::error::Result;

static SECRET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"sk-ant-[a-zA-Z0-9_-]+").unwrap(), "sk-ant-***"),
        (Regex::new(r"sk-(?:proj-)?[a-zA-Z0-9_-]{16,}").unwrap(), "sk-***"),
        (Regex::new(r"mcpb_[a-zA-Z0-9]+").unwrap(), "mcpb_***"),
        (Regex::new(r"gg_pro_[a-zA-Z0-9]+").unwrap(), "gg_pro_***"),
    ]
});

/// Format a size in bytes to human-readable form (1024-based)
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT && exp < 5 {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    let prefix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", bytes as f64 / div as f64, prefix)
}

/// Calculate the total size of all files in a directory
pub fn calculate_dir_size(path: &Path) -> u64 {
    if !path.exists() {
        return 0;
    }

    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Count regular files below a directory
pub fn count_files(path: &Path) -> usize {
    if !path.exists() {
        return 0;
    }

    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

/// Truncate to at most `max` characters, appending "..." when cut
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Mask API keys and license keys in a message before it is shown
pub fn sanitize(message: &str) -> String {
    let mut out = message.to_string();
    for (pattern, replacement) in SECRET_PATTERNS.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    out
}

/// Print a line in the given color, resetting afterwards
pub fn print_colored(color: Color, line: &str) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(color))?;
    println!("{}", line);
    stdout.execute(ResetColor)?;
    Ok(())
}

/// Print a prompt and read one trimmed line from `input`
pub fn prompt_line<R: BufRead>(input: &mut R, prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Interpret a `[Y/n]` answer; empty means yes
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer.is_empty() || answer == "y" || answer == "yes"
}
