// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! License records and the webhook events that change them
//!
//! Layout in the store:
//! - `license:<key>` holds a JSON [`LicenseRecord`]
//! - `customer:<id>` holds the key issued to a customer
//! - `session:<id>` holds the key issued for a checkout session

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{LicenseServiceError, Result};
use super::kv::KvStore;
use super::stripe::Event;
use crate::license::PRO_KEY_PREFIX;

const LICENSE_PREFIX: &str = "license:";
const CUSTOMER_PREFIX: &str = "customer:";
const SESSION_PREFIX: &str = "session:";
const KEY_RANDOM_CHARS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Active,
    PastDue,
    Cancelled,
}

impl LicenseStatus {
    /// Status for a subscription status string; `None` for states that
    /// leave the license unchanged (`incomplete`, `paused`, ...)
    pub fn from_subscription(status: &str) -> Option<Self> {
        match status {
            "active" | "trialing" => Some(Self::Active),
            "past_due" | "unpaid" => Some(Self::PastDue),
            "canceled" | "cancelled" | "incomplete_expired" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub key: String,
    pub customer_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    pub status: LicenseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LicenseRecord {
    pub fn is_valid(&self) -> bool {
        self.status == LicenseStatus::Active
    }
}

/// `gg_pro_` followed by 32 random alphanumerics
pub fn generate_key() -> String {
    let random: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(KEY_RANDOM_CHARS)
        .map(char::from)
        .collect();
    format!("{}{}", PRO_KEY_PREFIX, random)
}

/// What a webhook event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Issued { key: String },
    StatusChanged { key: String, status: LicenseStatus },
    Ignored { reason: String },
}

impl WebhookOutcome {
    fn ignored(reason: impl Into<String>) -> Self {
        Self::Ignored {
            reason: reason.into(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Issued { .. } => "issued".to_string(),
            Self::StatusChanged { status, .. } => format!("status:{}", status),
            Self::Ignored { reason } => format!("ignored: {}", reason),
        }
    }
}

/// License records on top of a [`KvStore`]
#[derive(Clone)]
pub struct LicenseBook {
    kv: Arc<dyn KvStore>,
}

impl LicenseBook {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub async fn find_by_key(&self, key: &str) -> Result<Option<LicenseRecord>> {
        match self.kv.get(&format!("{}{}", LICENSE_PREFIX, key)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// `customer:<id>` index first, then a scan of every license record
    pub async fn find_by_customer(&self, customer_id: &str) -> Result<Option<LicenseRecord>> {
        if let Some(key) = self
            .kv
            .get(&format!("{}{}", CUSTOMER_PREFIX, customer_id))
            .await?
        {
            if let Some(record) = self.find_by_key(&key).await? {
                return Ok(Some(record));
            }
            tracing::warn!("customer {} indexes missing license", customer_id);
        }

        for entry in self.kv.list(LICENSE_PREFIX).await? {
            let key = entry.trim_start_matches(LICENSE_PREFIX);
            match self.find_by_key(key).await {
                Ok(Some(record)) if record.customer_id == customer_id => {
                    tracing::debug!("found license for {} by scan", customer_id);
                    return Ok(Some(record));
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping unreadable {}: {}", entry, e),
            }
        }
        Ok(None)
    }

    pub async fn key_for_session(&self, session_id: &str) -> Result<Option<String>> {
        self.kv
            .get(&format!("{}{}", SESSION_PREFIX, session_id))
            .await
    }

    async fn store(&self, record: &LicenseRecord) -> Result<()> {
        self.kv
            .put(
                &format!("{}{}", LICENSE_PREFIX, record.key),
                &serde_json::to_string(record)?,
            )
            .await
    }

    /// Issue a key for a completed checkout session; a repeated delivery
    /// returns the key issued the first time
    pub async fn issue(&self, session: &Value) -> Result<LicenseRecord> {
        let session_id = str_field(session, "id")
            .ok_or_else(|| LicenseServiceError::BadRequest("session has no id".to_string()))?;
        let customer_id = str_field(session, "customer").ok_or_else(|| {
            LicenseServiceError::BadRequest("session has no customer".to_string())
        })?;

        if let Some(key) = self.key_for_session(session_id).await? {
            if let Some(record) = self.find_by_key(&key).await? {
                tracing::info!("session {} already issued a license", session_id);
                return Ok(record);
            }
        }

        let email = str_field(session, "customer_email")
            .or_else(|| session.pointer("/customer_details/email").and_then(Value::as_str))
            .map(String::from);
        let now = Utc::now();
        let record = LicenseRecord {
            key: generate_key(),
            customer_id: customer_id.to_string(),
            email,
            subscription_id: str_field(session, "subscription").map(String::from),
            status: LicenseStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.store(&record).await?;
        self.kv
            .put(&format!("{}{}", CUSTOMER_PREFIX, customer_id), &record.key)
            .await?;
        self.kv
            .put(&format!("{}{}", SESSION_PREFIX, session_id), &record.key)
            .await?;

        tracing::info!("issued license for customer {}", customer_id);
        Ok(record)
    }

    /// Set the status of a customer's license; `None` when the customer has none
    pub async fn set_status(
        &self,
        customer_id: &str,
        status: LicenseStatus,
    ) -> Result<Option<LicenseRecord>> {
        let Some(mut record) = self.find_by_customer(customer_id).await? else {
            return Ok(None);
        };
        record.status = status;
        record.updated_at = Utc::now();
        self.store(&record).await?;
        tracing::info!("license for customer {} is now {}", customer_id, status);
        Ok(Some(record))
    }

    pub async fn handle_event(&self, event: &Event) -> Result<WebhookOutcome> {
        let object = &event.data.object;
        let status = match event.kind.as_str() {
            "checkout.session.completed" => {
                let record = self.issue(object).await?;
                return Ok(WebhookOutcome::Issued { key: record.key });
            }
            "customer.subscription.updated" => {
                let Some(status) = str_field(object, "status")
                    .and_then(LicenseStatus::from_subscription)
                else {
                    return Ok(WebhookOutcome::ignored("subscription status unchanged"));
                };
                status
            }
            "customer.subscription.deleted" => LicenseStatus::Cancelled,
            "invoice.payment_failed" => LicenseStatus::PastDue,
            other => {
                tracing::debug!("ignoring event {}", other);
                return Ok(WebhookOutcome::ignored(format!("unhandled event {}", other)));
            }
        };

        let Some(customer_id) = str_field(object, "customer") else {
            return Ok(WebhookOutcome::ignored("event has no customer"));
        };
        match self.set_status(customer_id, status).await? {
            Some(record) => Ok(WebhookOutcome::StatusChanged {
                key: record.key,
                status,
            }),
            None => {
                tracing::warn!("no license for customer {}", customer_id);
                Ok(WebhookOutcome::ignored(format!(
                    "unknown customer {}",
                    customer_id
                )))
            }
        }
    }
}

fn str_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::is_pro_key;
    use crate::license_server::kv::MemoryKv;
    use serde_json::json;

    fn book() -> (LicenseBook, Arc<MemoryKv>) {
        let kv = Arc::new(MemoryKv::new());
        (LicenseBook::new(kv.clone()), kv)
    }

    fn event(kind: &str, object: Value) -> Event {
        serde_json::from_value(json!({"type": kind, "data": {"object": object}})).unwrap()
    }

    fn completed(session: &str, customer: &str) -> Event {
        event(
            "checkout.session.completed",
            json!({
                "id": session,
                "customer": customer,
                "subscription": "sub_1",
                "customer_details": {"email": "dev@example.com"}
            }),
        )
    }

    #[test]
    fn test_generate_key_shape() {
        let key = generate_key();
        assert!(is_pro_key(&key));
        let random = key.trim_start_matches(PRO_KEY_PREFIX);
        assert_eq!(random.len(), 32);
        assert!(random.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(generate_key(), key);
    }

    #[test]
    fn test_subscription_status_mapping() {
        assert_eq!(
            LicenseStatus::from_subscription("trialing"),
            Some(LicenseStatus::Active)
        );
        assert_eq!(
            LicenseStatus::from_subscription("unpaid"),
            Some(LicenseStatus::PastDue)
        );
        assert_eq!(
            LicenseStatus::from_subscription("canceled"),
            Some(LicenseStatus::Cancelled)
        );
        assert_eq!(LicenseStatus::from_subscription("incomplete"), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(LicenseStatus::PastDue).unwrap(),
            json!("past_due")
        );
    }

    #[tokio::test]
    async fn test_checkout_issues_and_indexes() {
        let (book, kv) = book();
        let outcome = book.handle_event(&completed("cs_1", "cus_1")).await.unwrap();
        let WebhookOutcome::Issued { key } = outcome else {
            panic!("expected Issued");
        };

        let record = book.find_by_key(&key).await.unwrap().unwrap();
        assert!(record.is_valid());
        assert_eq!(record.email.as_deref(), Some("dev@example.com"));
        assert_eq!(record.subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(
            kv.get("customer:cus_1").await.unwrap().as_deref(),
            Some(key.as_str())
        );
        assert_eq!(book.key_for_session("cs_1").await.unwrap(), Some(key));
    }

    #[tokio::test]
    async fn test_repeated_checkout_delivery_keeps_key() {
        let (book, _) = book();
        let first = book.handle_event(&completed("cs_1", "cus_1")).await.unwrap();
        let second = book.handle_event(&completed("cs_1", "cus_1")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_status_events() {
        let (book, _) = book();
        book.handle_event(&completed("cs_1", "cus_1")).await.unwrap();

        let failed = event("invoice.payment_failed", json!({"customer": "cus_1"}));
        assert!(matches!(
            book.handle_event(&failed).await.unwrap(),
            WebhookOutcome::StatusChanged { status: LicenseStatus::PastDue, .. }
        ));

        let renewed = event(
            "customer.subscription.updated",
            json!({"customer": "cus_1", "status": "active"}),
        );
        assert!(matches!(
            book.handle_event(&renewed).await.unwrap(),
            WebhookOutcome::StatusChanged { status: LicenseStatus::Active, .. }
        ));

        let deleted = event("customer.subscription.deleted", json!({"customer": "cus_1"}));
        book.handle_event(&deleted).await.unwrap();
        let record = book.find_by_customer("cus_1").await.unwrap().unwrap();
        assert_eq!(record.status, LicenseStatus::Cancelled);
        assert!(!record.is_valid());
    }

    #[tokio::test]
    async fn test_unknown_customer_and_event_are_ignored() {
        let (book, _) = book();
        let deleted = event("customer.subscription.deleted", json!({"customer": "cus_x"}));
        assert!(matches!(
            book.handle_event(&deleted).await.unwrap(),
            WebhookOutcome::Ignored { .. }
        ));

        let other = event("charge.refunded", json!({}));
        assert_eq!(
            book.handle_event(&other).await.unwrap().label(),
            "ignored: unhandled event charge.refunded"
        );
    }

    #[tokio::test]
    async fn test_customer_lookup_scans_unindexed_records() {
        let (book, kv) = book();
        let now = Utc::now();
        let record = LicenseRecord {
            key: "gg_pro_legacy".to_string(),
            customer_id: "cus_old".to_string(),
            email: None,
            subscription_id: None,
            status: LicenseStatus::Active,
            created_at: now,
            updated_at: now,
        };
        kv.put(
            "license:gg_pro_legacy",
            &serde_json::to_string(&record).unwrap(),
        )
        .await
        .unwrap();

        let found = book.find_by_customer("cus_old").await.unwrap();
        assert_eq!(found, Some(record));
        assert_eq!(book.find_by_customer("cus_none").await.unwrap(), None);
    }
}
