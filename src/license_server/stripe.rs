// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Stripe webhook signatures, events and checkout sessions

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use super::error::{LicenseServiceError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";

/// Maximum age of a signed webhook, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Check a `Stripe-Signature` header (`t=<ts>,v1=<hex>[,v1=<hex>...]`)
/// against `HMAC-SHA256("<ts>.<payload>")`.
pub fn verify_signature(header: &str, payload: &[u8], secret: &str, now: i64) -> Result<()> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| LicenseServiceError::InvalidSignature("missing timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(LicenseServiceError::InvalidSignature(
            "missing v1 signature".to_string(),
        ));
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(LicenseServiceError::InvalidSignature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    let mac = signed_mac(secret, timestamp, payload)?;
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(LicenseServiceError::InvalidSignature(
            "no matching signature".to_string(),
        ))
    }
}

/// Header value Stripe would send for `payload` at `timestamp`
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> Result<String> {
    let mac = signed_mac(secret, timestamp, payload)?;
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| LicenseServiceError::InvalidSignature(format!("bad secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// The parts of a webhook event the service reads
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

/// Checkout sessions through the Stripe REST API
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    url: Option<String>,
}

impl StripeClient {
    pub fn new(api_url: &str, secret_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    /// Subscription checkout for one unit of `price_id`; returns the hosted URL
    pub async fn create_checkout_session(
        &self,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String> {
        let form = [
            ("mode", "subscription"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LicenseServiceError::Stripe(format!(
                "checkout session returned {}: {}",
                status, body
            )));
        }

        let session: CheckoutSession = response.json().await?;
        session
            .url
            .ok_or_else(|| LicenseServiceError::Stripe("checkout session has no url".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_730_000_000;

    #[test]
    fn test_valid_signature() {
        let payload = br#"{"type":"ping"}"#;
        let header = signature_header(payload, SECRET, NOW).unwrap();
        assert!(verify_signature(&header, payload, SECRET, NOW + 10).is_ok());
    }

    #[test]
    fn test_any_v1_may_match() {
        let payload = b"{}";
        let good = signature_header(payload, SECRET, NOW).unwrap();
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "00".repeat(32), good_sig);
        assert!(verify_signature(&header, payload, SECRET, NOW).is_ok());
    }

    #[test]
    fn test_rejects_tampered_payload_and_wrong_secret() {
        let header = signature_header(b"{\"a\":1}", SECRET, NOW).unwrap();
        assert!(verify_signature(&header, b"{\"a\":2}", SECRET, NOW).is_err());
        assert!(verify_signature(&header, b"{\"a\":1}", "whsec_other", NOW).is_err());
    }

    #[test]
    fn test_rejects_stale_timestamp() {
        let header = signature_header(b"{}", SECRET, NOW).unwrap();
        assert!(verify_signature(&header, b"{}", SECRET, NOW + SIGNATURE_TOLERANCE_SECS).is_ok());
        assert!(
            verify_signature(&header, b"{}", SECRET, NOW + SIGNATURE_TOLERANCE_SECS + 1).is_err()
        );
    }

    #[test]
    fn test_rejects_malformed_headers() {
        let timestamp_only = format!("t={}", NOW);
        for header in ["", "v1=abcd", "t=abc,v1=abcd", timestamp_only.as_str(), "garbage"] {
            assert!(
                verify_signature(header, b"{}", SECRET, NOW).is_err(),
                "accepted {header:?}"
            );
        }
    }

    #[test]
    fn test_event_parses() {
        let event: Event = serde_json::from_value(json!({
            "id": "evt_1",
            "type": "invoice.payment_failed",
            "data": {"object": {"customer": "cus_1"}}
        }))
        .unwrap();
        assert_eq!(event.kind, "invoice.payment_failed");
        assert_eq!(event.data.object["customer"], "cus_1");
    }

    #[tokio::test]
    async fn test_create_checkout_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(bearer_token("sk_test"))
            .and(body_string_contains("mode=subscription"))
            .and(body_string_contains("price_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_1",
                "url": "https://checkout.stripe.com/c/pay/cs_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = StripeClient::new(&server.uri(), "sk_test");
        let url = client
            .create_checkout_session("price_123", "https://gg.sh/ok", "https://gg.sh")
            .await
            .unwrap();
        assert_eq!(url, "https://checkout.stripe.com/c/pay/cs_1");
    }

    #[tokio::test]
    async fn test_checkout_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("No such price"))
            .mount(&server)
            .await;

        let client = StripeClient::new(&server.uri(), "sk_test");
        let err = client
            .create_checkout_session("bad", "a", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, LicenseServiceError::Stripe(_)));
    }
}
