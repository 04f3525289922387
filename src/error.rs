// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for gg
//!
//! This module defines all error types used by the CLI and its library modules.

use thiserror::Error;

/// Main error type for gg operations
#[derive(Error, Debug)]
pub enum GgError {
    /// API-related errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secrets file could not be encrypted or decrypted
    #[error("Secrets error: {0}")]
    Secrets(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A package, formula, repo, chain or file does not exist
    #[error("{0}")]
    NotFound(String),

    /// Upstream registry returned an unexpected status
    #[error("{0}")]
    Registry(String),

    /// A git subprocess failed
    #[error("git error: {0}")]
    Git(String),

    /// A gh subprocess failed or returned unexpected output
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// License gating errors
    #[error("License error: {0}")]
    License(String),
}

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed (invalid API key)
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Rate limited by the API
    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    /// Requested model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Streaming error
    #[error("Streaming error: {0}")]
    StreamError(String),
}

/// Result type alias for gg operations
pub type Result<T> = std::result::Result<T, GgError>;

impl From<toml::de::Error> for GgError {
    fn from(err: toml::de::Error) -> Self {
        GgError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for GgError {
    fn from(err: toml::ser::Error) -> Self {
        GgError::Toml(err.to_string())
    }
}
