// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Command handlers
//!
//! One module per verb family. Handlers do the I/O; the lines they print
//! come from pure formatting functions in the library modules.

pub mod a2a;
pub mod cache;
pub mod chain;
pub mod config;
pub mod generate;
pub mod packages;
pub mod pr;
pub mod repo;
pub mod run;
pub mod stats;

use std::path::{Path, PathBuf};

use crate::cache::DiskCache;
use crate::chain::ChainStore;
use crate::config::{Config, GgPaths, Settings};
use crate::error::Result;
use crate::usage::UsageStore;

/// Where a command runs and where gg keeps its files
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub paths: GgPaths,
    pub workdir: PathBuf,
}

impl CommandContext {
    pub fn new(paths: GgPaths, workdir: impl Into<PathBuf>) -> Self {
        Self {
            paths,
            workdir: workdir.into(),
        }
    }

    /// `-C <dir>` or the current directory, with the resolved gg home
    pub fn resolve(directory: Option<PathBuf>) -> Result<Self> {
        let workdir = match directory {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        Ok(Self::new(GgPaths::resolve(), workdir))
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn cache(&self) -> DiskCache {
        DiskCache::new(self.paths.cache_dir())
    }

    pub fn usage(&self) -> UsageStore {
        UsageStore::new(self.paths.stats_file())
    }

    pub fn chains(&self) -> ChainStore {
        ChainStore::new(self.paths.chains_dir())
    }

    /// Settings and secrets; fails when `gg config init` has not run
    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.paths)
    }

    /// Settings for commands that work without `gg config init`
    pub fn settings_or_default(&self) -> Settings {
        match Settings::load_from(&self.paths.config_file()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!("using default settings: {}", e);
                Settings::default()
            }
        }
    }
}

/// Print each line on its own line
pub fn print_lines<S: AsRef<str>>(lines: &[S]) {
    for line in lines {
        println!("{}", line.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_paths() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = CommandContext::new(GgPaths::new(dir.path().join(".gg")), dir.path());
        assert_eq!(ctx.cache().root(), dir.path().join(".gg/cache"));
        assert_eq!(ctx.chains().dir(), dir.path().join(".gg/chains"));
        assert_eq!(ctx.usage().path(), dir.path().join(".gg/stats.json"));
        assert_eq!(ctx.workdir(), dir.path());
    }

    #[test]
    fn test_settings_default_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = CommandContext::new(GgPaths::new(dir.path()), dir.path());
        assert_eq!(ctx.settings_or_default(), Settings::default());
        assert!(ctx.load_config().is_err());
    }

    #[test]
    fn test_settings_read_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = GgPaths::new(dir.path());
        let mut settings = Settings::default();
        settings.registry.npm_url = "http://localhost:4873".to_string();
        settings.save_to(&paths.config_file()).unwrap();

        let ctx = CommandContext::new(paths, dir.path());
        assert_eq!(
            ctx.settings_or_default().registry.npm_url,
            "http://localhost:4873"
        );
    }
}
