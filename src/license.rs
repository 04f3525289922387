// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Free/pro gating

use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{GgError, Result};

/// Every pro license key starts with this
pub const PRO_KEY_PREFIX: &str = "gg_pro_";

pub fn is_pro_key(key: &str) -> bool {
    key.starts_with(PRO_KEY_PREFIX)
}

/// Local check against the configured license, stored or `GG_PRO_LICENSE_KEY`
pub fn is_pro(config: &Config) -> bool {
    config.pro_license_key().as_deref().is_some_and(is_pro_key)
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    valid: bool,
}

/// Online verification against the license service
#[derive(Debug, Clone)]
pub struct LicenseClient {
    client: Client,
    verify_url: String,
}

impl LicenseClient {
    pub fn new(verify_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            verify_url: verify_url.into(),
        }
    }

    /// `GET {verify_url}?key=...`. When the service cannot be reached or
    /// answers with an error status, the prefix check decides.
    pub async fn verify(&self, key: &str) -> bool {
        match self.fetch(key).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("license verification failed, using local check: {}", e);
                is_pro_key(key)
            }
        }
    }

    async fn fetch(&self, key: &str) -> Result<bool> {
        let response = self
            .client
            .get(&self.verify_url)
            .query(&[("key", key)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GgError::License(format!(
                "verify returned {}",
                response.status().as_u16()
            )));
        }
        let body: VerifyResponse = response.json().await?;
        Ok(body.valid)
    }
}

/// Whether the configured license unlocks pro features
pub async fn check_pro(config: &Config) -> bool {
    let Some(url) = &config.settings.license.verify_url else {
        return is_pro(config);
    };
    match config.pro_license_key() {
        Some(key) => LicenseClient::new(url).verify(&key).await,
        None => false,
    }
}

/// Outcome of gating a pro command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allowed,
    /// Show the upgrade pitch and stop
    Upsell,
}

/// `--pro` without a license is an error; no license and no flag upsells
pub fn gate(is_pro: bool, pro_flag: bool) -> Result<Gate> {
    match (is_pro, pro_flag) {
        (true, _) => Ok(Gate::Allowed),
        (false, false) => Ok(Gate::Upsell),
        (false, true) => Err(GgError::License(
            "Pro license not found in config".to_string(),
        )),
    }
}

/// Printed instead of generating code on the free tier
pub fn upsell_lines(verb: &str) -> Vec<String> {
    vec![
        "🤖 Analyzing request...".to_string(),
        String::new(),
        "Implementation plan:".to_string(),
        "  1. Analyze repository structure".to_string(),
        "  2. Generate code changes".to_string(),
        "  3. Create pull request".to_string(),
        String::new(),
        "╔══════════════════════════════════════╗".to_string(),
        "║   gg Pro required for this feature  ║".to_string(),
        "╚══════════════════════════════════════╝".to_string(),
        String::new(),
        "Pro features:".to_string(),
        "  • Full Claude-powered code generation".to_string(),
        format!("  • Unlimited gg {} commands", verb),
        "  • Priority API access".to_string(),
        String::new(),
        "Upgrade: https://ggdotdev.com/pro ($15/month)".to_string(),
        format!("Or use: gg {} \"...\" --pro", verb),
    ]
}
