// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg-license`: issues and verifies pro license keys
//!
//! Stripe checkout and webhooks drive the license lifecycle; records live
//! in a key-value store (Cloudflare Workers KV, or memory for local runs).

pub mod error;
pub mod kv;
pub mod records;
pub mod stripe;

pub use error::LicenseServiceError;
pub use kv::{CloudflareKv, KvStore, MemoryKv};
pub use records::{generate_key, LicenseBook, LicenseRecord, LicenseStatus, WebhookOutcome};

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use self::error::Result;
use self::kv::DEFAULT_CLOUDFLARE_API_URL;
use self::stripe::{verify_signature, Event, StripeClient, DEFAULT_STRIPE_API_URL};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8787";
const DEFAULT_SUCCESS_URL: &str = "https://gg.sh/success?session_id={CHECKOUT_SESSION_ID}";
const DEFAULT_CANCEL_URL: &str = "https://gg.sh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudflareConfig {
    pub api_url: String,
    pub account_id: String,
    pub namespace_id: String,
    pub api_token: String,
}

/// Service settings, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_api_url: String,
    pub success_url: String,
    pub cancel_url: String,
    pub cloudflare: Option<CloudflareConfig>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let cloudflare = match (
            var("CF_ACCOUNT_ID"),
            var("CF_KV_NAMESPACE_ID"),
            var("CF_API_TOKEN"),
        ) {
            (Some(account_id), Some(namespace_id), Some(api_token)) => Some(CloudflareConfig {
                api_url: var("CF_API_URL")
                    .unwrap_or_else(|| DEFAULT_CLOUDFLARE_API_URL.to_string()),
                account_id,
                namespace_id,
                api_token,
            }),
            _ => None,
        };

        Self {
            addr: var("GG_LICENSE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            stripe_secret_key: var("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
            stripe_price_id: var("STRIPE_PRICE_ID"),
            stripe_api_url: var("STRIPE_API_URL")
                .unwrap_or_else(|| DEFAULT_STRIPE_API_URL.to_string()),
            success_url: var("GG_SUCCESS_URL").unwrap_or_else(|| DEFAULT_SUCCESS_URL.to_string()),
            cancel_url: var("GG_CANCEL_URL").unwrap_or_else(|| DEFAULT_CANCEL_URL.to_string()),
            cloudflare,
        }
    }

    /// Cloudflare KV when configured, memory otherwise
    pub fn build_store(&self) -> Arc<dyn KvStore> {
        match &self.cloudflare {
            Some(cf) => Arc::new(CloudflareKv::new(
                &cf.api_url,
                &cf.account_id,
                &cf.namespace_id,
                &cf.api_token,
            )),
            None => {
                tracing::warn!(
                    "CF_ACCOUNT_ID/CF_KV_NAMESPACE_ID/CF_API_TOKEN not set; licenses are kept in memory"
                );
                Arc::new(MemoryKv::new())
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub licenses: LicenseBook,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, kv: Arc<dyn KvStore>) -> Self {
        Self {
            licenses: LicenseBook::new(kv),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/checkout", post(checkout))
        .route("/webhook", post(webhook))
        .route("/verify", get(verify))
        .route("/license", get(license))
        .with_state(state)
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let kv = config.build_store();
    let addr = config.addr.clone();
    let app = router(AppState::new(config, kv));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("gg-license listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "service": "gg-license"}))
}

async fn checkout(State(state): State<AppState>) -> Result<Json<Value>> {
    let config = &state.config;
    let secret_key = config
        .stripe_secret_key
        .as_deref()
        .ok_or(LicenseServiceError::NotConfigured("STRIPE_SECRET_KEY"))?;
    let price_id = config
        .stripe_price_id
        .as_deref()
        .ok_or(LicenseServiceError::NotConfigured("STRIPE_PRICE_ID"))?;

    let url = StripeClient::new(&config.stripe_api_url, secret_key)
        .create_checkout_session(price_id, &config.success_url, &config.cancel_url)
        .await?;
    Ok(Json(json!({ "url": url })))
}

async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let secret = state
        .config
        .stripe_webhook_secret
        .as_deref()
        .ok_or(LicenseServiceError::NotConfigured("STRIPE_WEBHOOK_SECRET"))?;
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            LicenseServiceError::InvalidSignature("missing Stripe-Signature header".to_string())
        })?;
    verify_signature(signature, &body, secret, chrono::Utc::now().timestamp())?;

    let event: Event = serde_json::from_slice(&body)
        .map_err(|e| LicenseServiceError::BadRequest(format!("invalid event: {}", e)))?;
    let outcome = state.licenses.handle_event(&event).await?;
    tracing::info!("webhook {}: {}", event.kind, outcome.label());

    Ok(Json(json!({"received": true, "result": outcome.label()})))
}

#[derive(Debug, Deserialize)]
struct VerifyQuery {
    key: Option<String>,
}

async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<Value>> {
    let key = query
        .key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| LicenseServiceError::BadRequest("missing key".to_string()))?;

    let body = match state.licenses.find_by_key(&key).await? {
        Some(record) => json!({"valid": record.is_valid(), "status": record.status}),
        None => json!({"valid": false, "status": "unknown"}),
    };
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
struct LicenseQuery {
    session_id: Option<String>,
}

async fn license(
    State(state): State<AppState>,
    Query(query): Query<LicenseQuery>,
) -> Result<Json<Value>> {
    let session_id = query
        .session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LicenseServiceError::BadRequest("missing session_id".to_string()))?;

    match state.licenses.key_for_session(&session_id).await? {
        Some(key) => Ok(Json(json!({ "key": key }))),
        None => Err(LicenseServiceError::NotFound(
            "no license for this session".to_string(),
        )),
    }
}
