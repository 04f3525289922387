// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Package registry lookups
//!
//! npm and Homebrew metadata is fetched once, cached on disk, and reduced to
//! a few labeled lines.

pub mod brew;
pub mod npm;

pub use brew::{BrewCli, BrewLookup, BrewSummary};
pub use npm::{NpmLookup, NpmSummary};

use reqwest::Client;
use serde_json::Value;

use crate::config::RegistryConfig;
use crate::error::{GgError, Result};

/// Approximate token cost of one npm summary
pub const NPM_TOKEN_COST: u32 = 18;
/// Approximate token cost of one brew summary
pub const BREW_TOKEN_COST: u32 = 22;

/// Where a lookup's data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Local `brew info` output
    Local,
    /// Disk cache hit
    Cache,
    /// Fetched from the registry
    Remote,
}

/// HTTP client for the npm registry and the Homebrew formulae API
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    npm_url: String,
    brew_url: String,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            client: Client::new(),
            npm_url: config.npm_url.trim_end_matches('/').to_string(),
            brew_url: config.brew_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET {npm_url}/{pkg}/latest`
    pub async fn npm_latest(&self, pkg: &str) -> Result<Value> {
        let url = format!("{}/{}/latest", self.npm_url, pkg);
        self.get_json(&url, || format!("Package not found: {}", pkg), "npm registry")
            .await
    }

    /// `GET {brew_url}/formula/{formula}.json`
    pub async fn brew_formula(&self, formula: &str) -> Result<Value> {
        let url = format!("{}/formula/{}.json", self.brew_url, formula);
        self.get_json(
            &url,
            || format!("Formula not found: {}", formula),
            "Homebrew API",
        )
        .await
    }

    async fn get_json(
        &self,
        url: &str,
        not_found: impl FnOnce() -> String,
        label: &str,
    ) -> Result<Value> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GgError::NotFound(not_found()));
        }
        if !status.is_success() {
            return Err(GgError::Registry(format!(
                "{} error: {}",
                label,
                status.as_u16()
            )));
        }

        Ok(response.json().await?)
    }
}

/// String field or empty
pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RegistryClient {
        RegistryClient::new(&RegistryConfig {
            npm_url: server.uri(),
            brew_url: server.uri(),
            github_api_url: server.uri(),
        })
    }

    #[tokio::test]
    async fn test_npm_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/no-such-pkg/latest"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).npm_latest("no-such-pkg").await.unwrap_err();
        assert_eq!(err.to_string(), "Package not found: no-such-pkg");
    }

    #[tokio::test]
    async fn test_npm_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).npm_latest("lodash").await.unwrap_err();
        assert_eq!(err.to_string(), "npm registry error: 503");
    }

    #[tokio::test]
    async fn test_brew_formula_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/formula/jq.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "jq"})))
            .mount(&server)
            .await;

        let value = client_for(&server).brew_formula("jq").await.unwrap();
        assert_eq!(str_field(&value, "name"), "jq");
    }
}
