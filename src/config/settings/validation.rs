// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{GgError, Result};

use super::Settings;

/// Providers `api.provider` may name.
pub const VALID_PROVIDERS: [&str; 3] = ["anthropic", "openai", "ollama"];

impl Settings {
    /// Reject values the providers would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if !VALID_PROVIDERS.contains(&self.api.provider.as_str()) {
            return Err(GgError::Config(format!(
                "Invalid provider '{}'. Valid providers: {}",
                self.api.provider,
                VALID_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.api.claude_temperature) {
            return Err(GgError::Config(format!(
                "claude_temperature must be between 0.0 and 2.0, got {}",
                self.api.claude_temperature
            )));
        }

        if self.api.max_tokens == 0 {
            return Err(GgError::Config("max_tokens must be positive".to_string()));
        }

        Ok(())
    }

    /// Model configured for the given provider.
    pub fn model_for(&self, provider: &str) -> String {
        match provider {
            "openai" => self.api.openai_model.clone(),
            "ollama" => self.api.ollama_model.clone(),
            _ => self.api.claude_model.clone(),
        }
    }
}
