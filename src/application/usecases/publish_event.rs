// Use case: publish_event.

use crate::domain::entities::subscription::{Subscription, WebhookPayload};

/// Producer-side helpers for building event envelopes and picking targets.
///
/// The producer enumerates the owner's subscriptions itself and calls
/// `DeliverWebhookUseCase` once per target.
pub struct PublishEvent;

impl PublishEvent {
    /// `{event, timestamp, data}` envelope stamped with the current time.
    pub fn payload(event: &str, data: serde_json::Value) -> WebhookPayload {
        WebhookPayload::new(event, data)
    }

    /// Active subscriptions interested in `event`.
    pub fn targets<'a>(
        subscriptions: &'a [Subscription],
        event: &'a str,
    ) -> impl Iterator<Item = &'a Subscription> + 'a {
        subscriptions.iter().filter(move |s| s.accepts(event))
    }
}

#[cfg(test)]
mod tests {
    use super::PublishEvent;
    use crate::domain::entities::subscription::Subscription;
    use crate::domain::value_objects::ids::OwnerId;
    use std::collections::BTreeSet;

    fn subscription(events: &[&str], active: bool) -> Subscription {
        let mut sub = Subscription::new(
            OwnerId::new(),
            "https://example.com/webhook".to_string(),
            "s1".to_string(),
            events.iter().map(|e| e.to_string()).collect::<BTreeSet<_>>(),
            None,
        );
        sub.active = active;
        sub
    }

    #[test]
    fn given_event_when_payload_should_carry_event_timestamp_and_data() {
        let payload = PublishEvent::payload("entry.created", serde_json::json!({"id": "e1"}));

        let value = payload.to_value();
        assert_eq!(value["event"], "entry.created");
        assert_eq!(value["data"]["id"], "e1");
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn given_mixed_subscriptions_when_targets_should_keep_active_matching_only() {
        let subs = vec![
            subscription(&["entry.created"], true),
            subscription(&["entry.created"], false),
            subscription(&["streak.milestone"], true),
        ];

        let targets: Vec<_> = PublishEvent::targets(&subs, "entry.created").collect();

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, subs[0].id);
    }
}
