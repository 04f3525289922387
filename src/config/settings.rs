// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for gg
//!
//! Handles loading and saving the plain configuration from ~/.gg/config.toml.
//! Secrets live in a separate age-encrypted file, see [`crate::config::secrets`].

use serde::{Deserialize, Serialize};

mod io;
mod validation;

pub use io::GgPaths;
pub use validation::VALID_PROVIDERS;

/// Main settings structure, stored in ~/.gg/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Client metadata
    #[serde(default)]
    pub gg: GgConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// GitHub workflow settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Online license verification
    #[serde(default)]
    pub license: LicenseConfig,

    /// Upstream registry endpoints
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Client metadata written by `gg config init`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GgConfig {
    /// Version that wrote the file
    #[serde(default = "default_version")]
    pub version: String,

    /// "free" or "pro"
    #[serde(default = "default_tier")]
    pub tier: String,
}

impl Default for GgConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            tier: default_tier(),
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Provider used by ask/edit/a2a: "anthropic", "openai" or "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Anthropic model
    #[serde(default = "default_claude_model")]
    pub claude_model: String,

    /// Sampling temperature (shared by all providers)
    #[serde(default = "default_temperature")]
    pub claude_temperature: f32,

    /// OpenAI model
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Ollama model
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    /// Ollama server URL
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Maaza orchestrator model
    #[serde(default = "default_maaza_model")]
    pub maaza_model: String,

    /// Maximum tokens in a response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Base URL override for the Anthropic API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_base_url: Option<String>,

    /// Base URL override for the OpenAI API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            claude_model: default_claude_model(),
            claude_temperature: default_temperature(),
            openai_model: default_openai_model(),
            ollama_model: default_ollama_model(),
            ollama_url: default_ollama_url(),
            maaza_model: default_maaza_model(),
            max_tokens: default_max_tokens(),
            anthropic_base_url: None,
            openai_base_url: None,
        }
    }
}

/// GitHub workflow settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitHubConfig {
    /// Branch PRs are opened against
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
        }
    }
}

/// Online license verification
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LicenseConfig {
    /// `GET {verify_url}?key=...` endpoint of the license service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_url: Option<String>,
}

/// Upstream registry endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryConfig {
    /// npm registry base URL
    #[serde(default = "default_npm_url")]
    pub npm_url: String,

    /// Homebrew formulae API base URL
    #[serde(default = "default_brew_url")]
    pub brew_url: String,

    /// GitHub REST API base URL
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            npm_url: default_npm_url(),
            brew_url: default_brew_url(),
            github_api_url: default_github_api_url(),
        }
    }
}

// Default value functions
fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_tier() -> String {
    "free".to_string()
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_claude_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ollama_model() -> String {
    "qwen2.5-coder:7b".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_maaza_model() -> String {
    "maaza-slm-360m".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_npm_url() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_brew_url() -> String {
    "https://formulae.brew.sh/api".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}
