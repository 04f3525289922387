// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Configuration module for gg
//!
//! Handles the plain settings file, the encrypted secrets and the paths
//! under the gg home directory.

pub mod secrets;
pub mod settings;

pub use secrets::Secrets;
pub use settings::*;

use crate::error::Result;

/// Settings and decrypted secrets, as used by the provider-backed commands.
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub secrets: Secrets,
    pub paths: GgPaths,
}

impl Config {
    /// Load config.toml and decrypt the secrets next to it.
    pub fn load(paths: &GgPaths) -> Result<Self> {
        let settings = Settings::load_from(&paths.config_file())?;
        settings.validate()?;

        let identity = secrets::read_identity(&paths.key_file())?;
        let secrets = Secrets::decrypt_from(&paths.secrets_file(), &identity)?;

        Ok(Self {
            settings,
            secrets,
            paths: paths.clone(),
        })
    }

    /// Anthropic key, `ANTHROPIC_API_KEY` first.
    pub fn anthropic_api_key(&self) -> Option<String> {
        env_or("ANTHROPIC_API_KEY", &self.secrets.claude_api_key)
    }

    /// OpenAI key, `OPENAI_API_KEY` first.
    pub fn openai_api_key(&self) -> Option<String> {
        env_or("OPENAI_API_KEY", &self.secrets.openai_api_key)
    }

    /// Pro license key, `GG_PRO_LICENSE_KEY` first.
    pub fn pro_license_key(&self) -> Option<String> {
        env_or("GG_PRO_LICENSE_KEY", &self.secrets.pro_license_key)
    }
}

fn env_or(var: &str, stored: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| stored.clone())
}
