use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::value_objects::ids::{OwnerId, SubscriptionId};
use crate::domain::value_objects::timestamps::Timestamp;

/// A registered webhook endpoint and its delivery statistics.
///
/// `secret` is write-once key material; it is only ever read by the signer and
/// never leaves the process through [`SubscriptionView`].
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub owner_id: OwnerId,
    pub url: String,
    pub secret: String,
    pub description: Option<String>,
    pub events: BTreeSet<String>,
    pub active: bool,
    pub disabled_reason: Option<String>,
    pub total_deliveries: u64,
    pub failed_deliveries: u64,
    pub consecutive_failures: u64,
    /// Most recent delivery outcomes, oldest first, `true` for success.
    pub recent_outcomes: Vec<bool>,
    pub last_triggered_at: Option<Timestamp>,
    pub last_success_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    pub fn new(
        owner_id: OwnerId,
        url: String,
        secret: String,
        events: BTreeSet<String>,
        description: Option<String>,
    ) -> Self {
        let now = Timestamp::now_utc();
        Self {
            id: SubscriptionId::new(),
            owner_id,
            url,
            secret,
            description,
            events,
            active: true,
            disabled_reason: None,
            total_deliveries: 0,
            failed_deliveries: 0,
            consecutive_failures: 0,
            recent_outcomes: Vec::new(),
            last_triggered_at: None,
            last_success_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` when this subscription should receive `event`.
    pub fn accepts(&self, event: &str) -> bool {
        self.active && self.events.contains(event)
    }

    pub fn view(&self) -> SubscriptionView {
        SubscriptionView::from(self)
    }
}

/// API-facing projection of a [`Subscription`]. Carries no key material.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub id: String,
    pub owner_id: String,
    pub url: String,
    pub description: Option<String>,
    pub events: Vec<String>,
    pub active: bool,
    pub disabled_reason: Option<String>,
    pub total_deliveries: u64,
    pub failed_deliveries: u64,
    pub consecutive_failures: u64,
    pub last_triggered_at: Option<String>,
    pub last_success_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Subscription> for SubscriptionView {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: sub.id.to_string(),
            owner_id: sub.owner_id.to_string(),
            url: sub.url.clone(),
            description: sub.description.clone(),
            events: sub.events.iter().cloned().collect(),
            active: sub.active,
            disabled_reason: sub.disabled_reason.clone(),
            total_deliveries: sub.total_deliveries,
            failed_deliveries: sub.failed_deliveries,
            consecutive_failures: sub.consecutive_failures,
            last_triggered_at: sub.last_triggered_at.map(|t| t.to_rfc3339()),
            last_success_at: sub.last_success_at.map(|t| t.to_rfc3339()),
            created_at: sub.created_at.to_rfc3339(),
            updated_at: sub.updated_at.to_rfc3339(),
        }
    }
}

/// Owner-supplied partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionPatch {
    pub url: Option<String>,
    pub secret: Option<String>,
    pub events: Option<BTreeSet<String>>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub active: Option<bool>,
}

impl SubscriptionPatch {
    /// Apply the patch. Fields are assumed already validated.
    pub fn apply_to(self, sub: &mut Subscription, now: Timestamp) {
        if let Some(url) = self.url {
            sub.url = url;
        }
        if let Some(secret) = self.secret {
            sub.secret = secret;
        }
        if let Some(events) = self.events {
            sub.events = events;
        }
        if let Some(description) = self.description {
            sub.description = description;
        }
        match self.active {
            Some(true) if !sub.active => {
                // Owner re-enable starts a fresh failure window.
                sub.active = true;
                sub.disabled_reason = None;
                sub.recent_outcomes.clear();
            }
            Some(false) => sub.active = false,
            _ => {}
        }
        sub.updated_at = now;
    }
}

/// Result of a single HTTP round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a full `deliver` call across all attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    pub success: bool,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Event envelope sent as the request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub data: serde_json::Value,
}

impl WebhookPayload {
    /// Producer envelope: `{event, timestamp, data}`.
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            timestamp: Some(Timestamp::now_utc().to_rfc3339()),
            data,
        }
    }

    /// Synthetic envelope used by the endpoint test operation.
    pub fn test() -> Self {
        Self {
            event: "test".to_string(),
            timestamp: None,
            data: serde_json::json!({
                "message": "This is a test webhook delivery from hookshot."
            }),
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Subscription {
        Subscription::new(
            OwnerId::new(),
            "https://example.com/webhook".to_string(),
            "s1".to_string(),
            BTreeSet::from(["entry.created".to_string()]),
            None,
        )
    }

    #[test]
    fn given_new_subscription_when_created_should_be_active_with_zero_counters() {
        let sub = sample();
        assert!(sub.active);
        assert_eq!(sub.total_deliveries, 0);
        assert_eq!(sub.failed_deliveries, 0);
        assert!(sub.disabled_reason.is_none());
        assert!(sub.recent_outcomes.is_empty());
    }

    #[test]
    fn given_view_when_serialized_should_not_contain_secret() {
        let sub = sample();
        let json = serde_json::to_value(sub.view()).unwrap();
        assert!(json.get("secret").is_none());
        assert!(!json.to_string().contains("\"s1\""));
        assert_eq!(json["active"], true);
        assert_eq!(json["events"], serde_json::json!(["entry.created"]));
    }

    #[test]
    fn given_matching_event_when_accepts_should_respect_active_flag() {
        let mut sub = sample();
        assert!(sub.accepts("entry.created"));
        assert!(!sub.accepts("entry.deleted"));
        sub.active = false;
        assert!(!sub.accepts("entry.created"));
    }

    #[test]
    fn given_reenable_patch_when_applied_should_clear_reason_and_window() {
        let mut sub = sample();
        sub.active = false;
        sub.disabled_reason = Some("sustained delivery failure rate".to_string());
        sub.recent_outcomes = vec![false; 20];

        SubscriptionPatch {
            active: Some(true),
            ..Default::default()
        }
        .apply_to(&mut sub, Timestamp::now_utc());

        assert!(sub.active);
        assert!(sub.disabled_reason.is_none());
        assert!(sub.recent_outcomes.is_empty());
    }

    #[test]
    fn given_disable_patch_when_applied_should_leave_reason_empty() {
        let mut sub = sample();
        SubscriptionPatch {
            active: Some(false),
            description: Some(Some("paused".to_string())),
            ..Default::default()
        }
        .apply_to(&mut sub, Timestamp::now_utc());

        assert!(!sub.active);
        assert!(sub.disabled_reason.is_none());
        assert_eq!(sub.description.as_deref(), Some("paused"));
    }

    #[test]
    fn given_test_payload_when_serialized_should_carry_test_event_and_message() {
        let value = WebhookPayload::test().to_value();
        assert_eq!(value["event"], "test");
        assert!(value["data"]["message"].as_str().unwrap().contains("test"));
        assert!(value.get("timestamp").is_none());
    }
}
