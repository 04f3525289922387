// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Provider factory for creating LLM providers

use std::sync::Arc;

use crate::config::{Config, Settings};
use crate::error::{GgError, Result};
use crate::llm::provider::LlmProvider;
use crate::llm::providers::{AnthropicProvider, OllamaProvider, OpenAiProvider};

/// Factory for creating LLM providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create an LLM provider by name: "anthropic", "openai" or "ollama"
    pub fn create(provider_name: &str, config: &Config) -> Result<Arc<dyn LlmProvider>> {
        match provider_name {
            "anthropic" => Self::create_anthropic(config),
            "openai" => Self::create_openai(config),
            "ollama" => Ok(Arc::new(OllamaProvider::with_base_url(
                &config.settings.api.ollama_url,
            ))),
            other => Err(GgError::InvalidInput(format!(
                "Unknown provider: {}. Use anthropic, openai or ollama",
                other
            ))),
        }
    }

    /// Create an Anthropic provider
    pub fn create_anthropic(config: &Config) -> Result<Arc<dyn LlmProvider>> {
        let api_key = config.anthropic_api_key().ok_or_else(|| {
            GgError::Config("Claude API key not configured. Run: gg config init".to_string())
        })?;

        let provider = match &config.settings.api.anthropic_base_url {
            Some(base_url) => AnthropicProvider::with_base_url(api_key, base_url),
            None => AnthropicProvider::new(api_key),
        };

        Ok(Arc::new(provider))
    }

    /// Create an OpenAI provider
    pub fn create_openai(config: &Config) -> Result<Arc<dyn LlmProvider>> {
        let api_key = config.openai_api_key().ok_or_else(|| {
            GgError::Config("OpenAI API key not configured. Run: gg config init".to_string())
        })?;

        let provider = match &config.settings.api.openai_base_url {
            Some(base_url) => OpenAiProvider::with_base_url(api_key, base_url),
            None => OpenAiProvider::new(api_key),
        };

        Ok(Arc::new(provider))
    }

    /// Get the configured model for a provider
    pub fn default_model(provider_name: &str, settings: &Settings) -> String {
        settings.model_for(provider_name)
    }
}
