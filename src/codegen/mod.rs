// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Turning model replies into files, commits and pull requests

pub mod extract;
pub mod workflow;

pub use extract::{count_blocks, parse_code_blocks, parse_unlabeled_blocks, validate_path, CodeFile};
pub use workflow::{edit_prompt, system_prompt, ChangeKind, GitWorkflow, PublishOutcome};

use std::path::Path;

/// Result of writing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: String,
    /// `None` when written
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_written(&self) -> bool {
        self.error.is_none()
    }

    pub fn line(&self) -> String {
        match &self.error {
            None => format!("✓ {}", self.path),
            Some(e) => format!("⚠️  Failed to write {}: {}", self.path, e),
        }
    }
}

/// Write every file below `root`; a failure is recorded and skipped
pub fn apply_files(root: &Path, files: &[CodeFile]) -> Vec<FileOutcome> {
    files
        .iter()
        .map(|file| {
            let error = write_one(root, file).err();
            if let Some(e) = &error {
                tracing::warn!("failed to write {}: {}", file.path, e);
            }
            FileOutcome {
                path: file.path.clone(),
                error,
            }
        })
        .collect()
}

fn write_one(root: &Path, file: &CodeFile) -> std::result::Result<(), String> {
    validate_path(&file.path).map_err(|e| e.to_string())?;
    let target = root.join(&file.path);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(&target, &file.content).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_files_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            CodeFile {
                path: "src/api/health.rs".to_string(),
                content: "pub fn ok() {}\n".to_string(),
            },
            CodeFile {
                path: "README.md".to_string(),
                content: "# x\n".to_string(),
            },
        ];

        let outcomes = apply_files(dir.path(), &files);
        assert!(outcomes.iter().all(FileOutcome::is_written));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("src/api/health.rs")).unwrap(),
            "pub fn ok() {}\n"
        );
        assert_eq!(outcomes[0].line(), "✓ src/api/health.rs");
    }

    #[test]
    fn test_apply_files_skips_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            CodeFile {
                path: "../escape.txt".to_string(),
                content: "x".to_string(),
            },
            CodeFile {
                path: "ok.txt".to_string(),
                content: "y".to_string(),
            },
        ];

        let outcomes = apply_files(dir.path(), &files);
        assert!(!outcomes[0].is_written());
        assert!(outcomes[0].line().starts_with("⚠️  Failed to write ../escape.txt"));
        assert!(outcomes[1].is_written());
        assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
    }
}
