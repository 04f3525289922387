// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Disk cache for registry and GitHub payloads
//!
//! One JSON file per key under `<root>/<namespace>/`. Entries never expire on
//! read; `clean` removes files by modification time.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::Value;

use crate::error::Result;
use crate::utils::{calculate_dir_size, count_files, format_size};

/// Cache namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Npm,
    Brew,
    GitHub,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Npm, Namespace::Brew, Namespace::GitHub];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Namespace::Npm => "npm",
            Namespace::Brew => "brew",
            Namespace::GitHub => "github",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            Namespace::Npm => "packages",
            Namespace::Brew => "formulas",
            Namespace::GitHub => "repos",
        }
    }
}

/// Size and entry count of one namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceStatus {
    pub namespace: Namespace,
    pub bytes: u64,
    pub entries: usize,
}

/// Result of [`DiskCache::status`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub total_bytes: u64,
    pub namespaces: Vec<NamespaceStatus>,
}

/// Result of [`DiskCache::clean`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Files seen during the walk
    pub scanned: usize,
    pub removed: usize,
    pub freed_bytes: u64,
}

/// File-per-key JSON cache
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`; `/` becomes `__`
    pub fn entry_path(&self, namespace: Namespace, key: &str) -> PathBuf {
        self.root
            .join(namespace.dir_name())
            .join(format!("{}.json", key.replace('/', "__")))
    }

    /// Cached value, or `None` when missing or unreadable
    pub fn get(&self, namespace: Namespace, key: &str) -> Option<Value> {
        let path = self.entry_path(namespace, key);
        let data = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("ignoring corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn put(&self, namespace: Namespace, key: &str, value: &Value) -> Result<()> {
        let path = self.entry_path(namespace, key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_vec(value)?)?;
        tracing::trace!("cached {}", path.display());
        Ok(())
    }

    pub fn status(&self) -> CacheStatus {
        let namespaces = Namespace::ALL
            .iter()
            .map(|&namespace| {
                let dir = self.root.join(namespace.dir_name());
                NamespaceStatus {
                    namespace,
                    bytes: calculate_dir_size(&dir),
                    entries: count_files(&dir),
                }
            })
            .collect();

        CacheStatus {
            total_bytes: calculate_dir_size(&self.root),
            namespaces,
        }
    }

    /// Remove every file older than `max_age`
    pub fn clean(&self, max_age: Duration) -> Result<CleanReport> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        self.clean_before(cutoff)
    }

    fn clean_before(&self, cutoff: SystemTime) -> Result<CleanReport> {
        let mut report = CleanReport::default();
        if !self.root.exists() {
            return Ok(report);
        }

        for entry in walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            report.scanned += 1;
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let modified = metadata.modified().unwrap_or(SystemTime::now());
            if modified < cutoff {
                match std::fs::remove_file(entry.path()) {
                    Ok(()) => {
                        report.removed += 1;
                        report.freed_bytes += metadata.len();
                    }
                    Err(e) => {
                        tracing::warn!("failed to remove {}: {}", entry.path().display(), e)
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Lines printed by `gg cache status`
pub fn status_lines(status: &CacheStatus, location: &Path) -> Vec<String> {
    let mut lines = vec![
        "📦 Cache Status".to_string(),
        String::new(),
        format!("   Total: {}", format_size(status.total_bytes)),
    ];
    for ns in &status.namespaces {
        let label = format!("{}:", ns.namespace.dir_name());
        lines.push(format!(
            "   {:<7}{} ({} {})",
            label,
            format_size(ns.bytes),
            ns.entries,
            ns.namespace.noun()
        ));
    }
    lines.push(String::new());
    lines.push(format!("   Location: {}", location.display()));
    lines
}

/// Line printed by `gg cache clean`
pub fn clean_line(report: &CleanReport) -> String {
    if report.scanned == 0 {
        "📦 Cache is empty".to_string()
    } else if report.removed == 0 {
        "🧹 No old cache entries to clean".to_string()
    } else {
        format!(
            "🧹 Cleaned cache: {} freed ({} entries removed)",
            format_size(report.freed_bytes),
            report.removed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        assert!(cache.get(Namespace::Npm, "lodash").is_none());

        let value = json!({"name": "lodash", "version": "4.17.21"});
        cache.put(Namespace::Npm, "lodash", &value).unwrap();
        assert_eq!(cache.get(Namespace::Npm, "lodash"), Some(value));
        assert!(cache.get(Namespace::Brew, "lodash").is_none());
    }

    #[test]
    fn test_slash_keys_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache
            .put(Namespace::Npm, "@types/node", &json!({"name": "@types/node"}))
            .unwrap();
        cache
            .put(Namespace::GitHub, "rust-lang/rust", &json!({}))
            .unwrap();

        assert!(dir.path().join("npm/@types__node.json").exists());
        assert!(dir.path().join("github/rust-lang__rust.json").exists());
        assert!(cache.get(Namespace::Npm, "@types/node").is_some());
    }

    #[test]
    fn test_corrupt_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        let path = cache.entry_path(Namespace::Brew, "jq");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{not json").unwrap();
        assert!(cache.get(Namespace::Brew, "jq").is_none());
    }

    #[test]
    fn test_status_counts() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.put(Namespace::Npm, "a", &json!({"x": 1})).unwrap();
        cache.put(Namespace::Npm, "b", &json!({"x": 2})).unwrap();
        cache.put(Namespace::Brew, "jq", &json!({})).unwrap();

        let status = cache.status();
        assert_eq!(status.namespaces[0].entries, 2);
        assert_eq!(status.namespaces[1].entries, 1);
        assert_eq!(status.namespaces[2].entries, 0);
        let sum: u64 = status.namespaces.iter().map(|n| n.bytes).sum();
        assert_eq!(status.total_bytes, sum);

        let lines = status_lines(&status, dir.path());
        assert_eq!(lines[0], "📦 Cache Status");
        assert!(lines.iter().any(|l| l.contains("(2 packages)")));
        assert!(lines.iter().any(|l| l.contains("(1 formulas)")));
        assert!(lines.iter().any(|l| l.contains("(0 repos)")));
    }

    #[test]
    fn test_clean_removes_only_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.put(Namespace::Npm, "old", &json!({"v": 1})).unwrap();
        cache.put(Namespace::Npm, "new", &json!({"v": 2})).unwrap();

        let old_path = cache.entry_path(Namespace::Npm, "old");
        let ten_days_ago = SystemTime::now() - Duration::from_secs(10 * 24 * 3600);
        std::fs::File::options()
            .write(true)
            .open(&old_path)
            .unwrap()
            .set_modified(ten_days_ago)
            .unwrap();

        let report = cache.clean(Duration::from_secs(7 * 24 * 3600)).unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.removed, 1);
        assert!(report.freed_bytes > 0);
        assert!(!old_path.exists());
        assert!(cache.get(Namespace::Npm, "new").is_some());
        assert!(clean_line(&report).starts_with("🧹 Cleaned cache:"));
    }

    #[test]
    fn test_clean_empty_and_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("missing"));
        let report = cache.clean(Duration::from_secs(60)).unwrap();
        assert_eq!(clean_line(&report), "📦 Cache is empty");

        let cache = DiskCache::new(dir.path());
        cache.put(Namespace::Brew, "jq", &json!({})).unwrap();
        let report = cache.clean(Duration::from_secs(3600)).unwrap();
        assert_eq!(clean_line(&report), "🧹 No old cache entries to clean");
    }
}
