// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LicenseServiceError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A required setting is missing
    #[error("not configured: {0}")]
    NotConfigured(&'static str),

    #[error("key-value store error: {0}")]
    Kv(String),

    #[error("payments API error: {0}")]
    Stripe(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LicenseServiceError>;

impl LicenseServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSignature(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Kv(_) | Self::Stripe(_) | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::Json(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LicenseServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Upstream and internal details stay in the log
        let message = match &self {
            Self::InvalidSignature(_) => "Invalid signature".to_string(),
            Self::BadRequest(msg) | Self::NotFound(msg) => msg.clone(),
            Self::NotConfigured(what) => format!("{} not configured", what),
            Self::Kv(_) | Self::Stripe(_) | Self::Http(_) => "Upstream error".to_string(),
            Self::Json(_) | Self::Io(_) => "Internal server error".to_string(),
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
