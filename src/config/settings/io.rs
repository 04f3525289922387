// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::{Path, PathBuf};

use crate::error::{GgError, Result};

use super::Settings;

/// Locations of every file gg keeps under its home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GgPaths {
    home: PathBuf,
}

impl GgPaths {
    /// Use an explicit home directory.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// `$GG_HOME` if set, otherwise `~/.gg`.
    pub fn resolve() -> Self {
        if let Ok(home) = std::env::var("GG_HOME") {
            return Self::new(home);
        }
        Self::new(
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".gg"),
        )
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn key_file(&self) -> PathBuf {
        self.home.join(".key")
    }

    pub fn secrets_file(&self) -> PathBuf {
        self.home.join("secrets")
    }

    pub fn stats_file(&self) -> PathBuf {
        self.home.join("stats.json")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.home.join("cache")
    }

    pub fn chains_dir(&self) -> PathBuf {
        self.home.join("chains")
    }

    /// Create the home directory (mode 0700 on unix).
    pub fn ensure_home(&self) -> Result<()> {
        std::fs::create_dir_all(&self.home)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.home, std::fs::Permissions::from_mode(0o700))?;
        }
        Ok(())
    }
}

impl Settings {
    /// Load settings from a specific path. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GgError::Config(
                "config not found. Run: gg config init".to_string(),
            ));
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a specific path, creating the parent directory.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
