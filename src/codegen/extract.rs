// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Fenced code block extraction

use std::path::{Component, Path};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{GgError, Result};

// ```lang:path, body up to the next fence
static LABELED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[^\s:`]*:([^\n]+)\n([\s\S]*?)```").unwrap());

/// A file the model asked to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFile {
    pub path: String,
    pub content: String,
}

/// Blocks fenced as ```` ```lang:path ````, in order of first appearance.
/// A later block for the same path replaces the earlier content.
pub fn parse_code_blocks(text: &str) -> Vec<CodeFile> {
    let mut files: Vec<CodeFile> = Vec::new();

    for caps in LABELED_BLOCK.captures_iter(text) {
        let path = caps[1].trim().to_string();
        if path.is_empty() {
            continue;
        }
        let content = caps[2].to_string();

        match files.iter_mut().find(|f| f.path == path) {
            Some(existing) => existing.content = content,
            None => files.push(CodeFile { path, content }),
        }
    }

    files
}

struct Fence<'a> {
    info: &'a str,
    body: String,
}

impl Fence<'_> {
    /// `lang:path` before any whitespace in the info string
    fn is_labeled(&self) -> bool {
        self.info
            .split(char::is_whitespace)
            .next()
            .is_some_and(|token| token.contains(':'))
    }
}

/// Pair fence lines in order. A line starting with ``` opens a block and the
/// next such line closes it; an unclosed block is dropped.
fn fences(text: &str) -> Vec<Fence<'_>> {
    let mut closed = Vec::new();
    let mut open: Option<Fence<'_>> = None;

    for line in text.split_inclusive('\n') {
        let marker = line.trim_start().strip_prefix("```");
        match open.take() {
            None => {
                if let Some(info) = marker {
                    open = Some(Fence {
                        info: info.trim(),
                        body: String::new(),
                    });
                }
            }
            Some(mut fence) => match marker {
                Some(_) => closed.push(fence),
                None => {
                    fence.body.push_str(line);
                    open = Some(fence);
                }
            },
        }
    }

    closed
}

/// Bodies of fenced blocks that carry no path label
pub fn parse_unlabeled_blocks(text: &str) -> Vec<String> {
    fences(text)
        .into_iter()
        .filter(|fence| !fence.is_labeled())
        .map(|fence| fence.body)
        .collect()
}

/// Number of fenced blocks of either kind
pub fn count_blocks(text: &str) -> usize {
    fences(text).len()
}

/// Reject paths that would escape the repository
pub fn validate_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(GgError::InvalidInput("empty file path".to_string()));
    }

    let p = Path::new(path);
    if p.is_absolute() || path.starts_with('/') || path.starts_with('\\') {
        return Err(GgError::InvalidInput(format!(
            "absolute path not allowed: {}",
            path
        )));
    }

    if p.components().any(|c| matches!(c, Component::ParentDir | Component::Prefix(_))) {
        return Err(GgError::InvalidInput(format!(
            "path escapes the repository: {}",
            path
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_block() {
        let text = "Here you go:\n```rust:src/main.rs\nfn main() {}\n```\nDone.";
        let files = parse_code_blocks(text);
        assert_eq!(
            files,
            vec![CodeFile {
                path: "src/main.rs".to_string(),
                content: "fn main() {}\n".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_multiple_blocks_in_order() {
        let text = "```go:b.go\npackage b\n```\n```toml:a/Cargo.toml\n[package]\n```\n";
        let paths: Vec<_> = parse_code_blocks(text).into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec!["b.go", "a/Cargo.toml"]);
    }

    #[test]
    fn test_duplicate_path_last_wins_first_position() {
        let text = "```py:x.py\nold\n```\n```py:y.py\ny\n```\n```py:x.py\nnew\n```";
        let files = parse_code_blocks(text);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "x.py");
        assert_eq!(files[0].content, "new\n");
    }

    #[test]
    fn test_path_is_trimmed_and_lang_optional() {
        let files = parse_code_blocks("```:  notes.txt  \nhello\n```");
        assert_eq!(files[0].path, "notes.txt");
    }

    #[test]
    fn test_unlabeled_blocks_ignored_by_labeled_parser() {
        let text = "```rust\nfn x() {}\n```";
        assert!(parse_code_blocks(text).is_empty());
        assert_eq!(parse_unlabeled_blocks(text), vec!["fn x() {}\n".to_string()]);
        assert_eq!(count_blocks(text), 1);
    }

    #[test]
    fn test_mixed_blocks_counted_once() {
        let text = "```rust:a.rs\na\n```\ntext\n```sh\ncargo test\n```\n```md:b.md\nb\n```";
        assert_eq!(count_blocks(text), 3);
        assert_eq!(parse_code_blocks(text).len(), 2);
        assert_eq!(parse_unlabeled_blocks(text), vec!["cargo test\n".to_string()]);
    }

    #[test]
    fn test_no_blocks() {
        assert!(parse_code_blocks("just prose").is_empty());
        assert!(parse_unlabeled_blocks("just prose").is_empty());
    }

    #[test]
    fn test_info_string_with_attributes_keeps_next_file() {
        let text = "```rust title=\"x\"\nlet x = 1;\n```\nprose\n```py:a.py\nprint(1)\n```\n";
        let files = parse_code_blocks(text);
        assert_eq!(
            files,
            vec![CodeFile {
                path: "a.py".to_string(),
                content: "print(1)\n".to_string()
            }]
        );
        assert_eq!(parse_unlabeled_blocks(text), vec!["let x = 1;\n".to_string()]);
        assert_eq!(count_blocks(text), 2);
    }

    #[test]
    fn test_trailing_space_after_lang_keeps_next_file() {
        let text = "```rust \nfn a() {}\n```\nThen:\n```rust:src/b.rs\nfn b() {}\n```\n";
        let files = parse_code_blocks(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/b.rs");
        assert_eq!(files[0].content, "fn b() {}\n");
        assert_eq!(parse_unlabeled_blocks(text), vec!["fn a() {}\n".to_string()]);
    }

    #[test]
    fn test_unclosed_fence_is_not_counted() {
        let text = "```sh\necho hi\n```\n```rust\nfn open() {";
        assert_eq!(count_blocks(text), 1);
        assert_eq!(parse_unlabeled_blocks(text), vec!["echo hi\n".to_string()]);
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("src/lib.rs").is_ok());
        assert!(validate_path("./README.md").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("../outside.txt").is_err());
        assert!(validate_path("src/../../x").is_err());
    }
}
