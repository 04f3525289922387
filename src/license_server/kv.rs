// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Key-value storage for license records

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::error::{LicenseServiceError, Result};

pub const DEFAULT_CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Every key starting with `prefix`, in key order
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// In-process store; contents are lost on restart
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Workers KV namespace over the Cloudflare REST API
#[derive(Debug, Clone)]
pub struct CloudflareKv {
    client: Client,
    namespace_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct KeysPage {
    #[serde(default)]
    result: Vec<KeyEntry>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct KeyEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    cursor: Option<String>,
}

impl CloudflareKv {
    pub fn new(api_url: &str, account_id: &str, namespace_id: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            namespace_url: format!(
                "{}/accounts/{}/storage/kv/namespaces/{}",
                api_url.trim_end_matches('/'),
                account_id,
                namespace_id
            ),
            token: token.to_string(),
        }
    }

    fn value_url(&self, key: &str) -> String {
        format!("{}/values/{}", self.namespace_url, key)
    }

    async fn keys_page(&self, prefix: &str, cursor: Option<&str>) -> Result<KeysPage> {
        let mut query = vec![("prefix", prefix)];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let response = self
            .client
            .get(format!("{}/keys", self.namespace_url))
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(LicenseServiceError::Kv(format!(
                "list {} returned {}",
                prefix,
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl KvStore for CloudflareKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.value_url(key))
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.text().await?)),
            status => Err(LicenseServiceError::Kv(format!(
                "get {} returned {}",
                key, status
            ))),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let response = self
            .client
            .put(self.value_url(key))
            .bearer_auth(&self.token)
            .body(value.to_string())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LicenseServiceError::Kv(format!(
                "put {} returned {}",
                key,
                response.status()
            )))
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.keys_page(prefix, cursor.as_deref()).await?;
            keys.extend(page.result.into_iter().map(|k| k.name));

            cursor = page
                .result_info
                .and_then(|info| info.cursor)
                .filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        tracing::debug!("listed {} keys under {}", keys.len(), prefix);
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NS: &str = "/accounts/acc/storage/kv/namespaces/ns";

    #[tokio::test]
    async fn test_memory_kv() {
        let kv = MemoryKv::new();
        kv.put("license:b", "2").await.unwrap();
        kv.put("license:a", "1").await.unwrap();
        kv.put("customer:c", "x").await.unwrap();

        assert_eq!(kv.get("license:a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(kv.get("missing").await.unwrap(), None);
        assert_eq!(
            kv.list("license:").await.unwrap(),
            vec!["license:a", "license:b"]
        );
    }

    #[tokio::test]
    async fn test_cloudflare_get_put() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/values/license:k1", NS)))
            .and(bearer_token("tok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"key\":\"k1\"}"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/values/license:nope", NS)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/values/customer:c1", NS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let kv = CloudflareKv::new(&server.uri(), "acc", "ns", "tok");
        assert_eq!(
            kv.get("license:k1").await.unwrap().as_deref(),
            Some("{\"key\":\"k1\"}")
        );
        assert_eq!(kv.get("license:nope").await.unwrap(), None);
        kv.put("customer:c1", "k1").await.unwrap();
    }

    #[tokio::test]
    async fn test_cloudflare_list_follows_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/keys", NS)))
            .and(query_param("prefix", "license:"))
            .and(query_param_is_missing("cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"name": "license:a"}],
                "result_info": {"cursor": "next"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{}/keys", NS)))
            .and(query_param("cursor", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{"name": "license:b"}],
                "result_info": {"cursor": ""}
            })))
            .mount(&server)
            .await;

        let kv = CloudflareKv::new(&server.uri(), "acc", "ns", "tok");
        assert_eq!(
            kv.list("license:").await.unwrap(),
            vec!["license:a", "license:b"]
        );
    }

    #[tokio::test]
    async fn test_cloudflare_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let kv = CloudflareKv::new(&server.uri(), "acc", "ns", "tok");
        assert!(matches!(
            kv.put("k", "v").await,
            Err(LicenseServiceError::Kv(_))
        ));
    }
}
