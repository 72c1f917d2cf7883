use std::collections::BTreeSet;

use time::OffsetDateTime;

use crate::domain::entities::subscription::Subscription;
use crate::domain::value_objects::ids::{OwnerId, SubscriptionId};
use crate::domain::value_objects::timestamps::Timestamp;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SubscriptionRow {
    pub id: uuid::Uuid,
    pub owner_id: uuid::Uuid,
    pub url: String,
    pub secret: String,
    pub description: Option<String>,
    pub events: Vec<String>,
    pub active: bool,
    pub disabled_reason: Option<String>,
    pub total_deliveries: i64,
    pub failed_deliveries: i64,
    pub consecutive_failures: i64,
    pub recent_outcomes: Vec<bool>,
    pub last_triggered_at: Option<OffsetDateTime>,
    pub last_success_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SubscriptionRow {
    pub fn from_subscription(sub: &Subscription) -> Self {
        Self {
            id: sub.id.as_uuid(),
            owner_id: sub.owner_id.as_uuid(),
            url: sub.url.clone(),
            secret: sub.secret.clone(),
            description: sub.description.clone(),
            events: sub.events.iter().cloned().collect(),
            active: sub.active,
            disabled_reason: sub.disabled_reason.clone(),
            total_deliveries: to_db_count(sub.total_deliveries),
            failed_deliveries: to_db_count(sub.failed_deliveries),
            consecutive_failures: to_db_count(sub.consecutive_failures),
            recent_outcomes: sub.recent_outcomes.clone(),
            last_triggered_at: sub.last_triggered_at.map(|t| t.as_inner()),
            last_success_at: sub.last_success_at.map(|t| t.as_inner()),
            created_at: sub.created_at.as_inner(),
            updated_at: sub.updated_at.as_inner(),
        }
    }

    pub fn into_subscription(self) -> Subscription {
        Subscription {
            id: SubscriptionId(self.id),
            owner_id: OwnerId(self.owner_id),
            url: self.url,
            secret: self.secret,
            description: self.description,
            events: self.events.into_iter().collect::<BTreeSet<_>>(),
            active: self.active,
            disabled_reason: self.disabled_reason,
            total_deliveries: self.total_deliveries.max(0) as u64,
            failed_deliveries: self.failed_deliveries.max(0) as u64,
            consecutive_failures: self.consecutive_failures.max(0) as u64,
            recent_outcomes: self.recent_outcomes,
            last_triggered_at: self.last_triggered_at.map(Timestamp::from),
            last_success_at: self.last_success_at.map(Timestamp::from),
            created_at: Timestamp::from(self.created_at),
            updated_at: Timestamp::from(self.updated_at),
        }
    }
}

fn to_db_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::SubscriptionRow;
    use crate::domain::entities::subscription::Subscription;
    use crate::domain::value_objects::ids::OwnerId;
    use crate::domain::value_objects::timestamps::Timestamp;
    use std::collections::BTreeSet;

    #[test]
    fn given_subscription_with_stats_when_converted_should_preserve_fields() {
        let mut sub = Subscription::new(
            OwnerId::new(),
            "https://example.com/webhook".to_string(),
            "s1".to_string(),
            BTreeSet::from(["a".to_string(), "b".to_string()]),
            Some("desc".to_string()),
        );
        sub.total_deliveries = 4;
        sub.failed_deliveries = 1;
        sub.recent_outcomes = vec![true, false, true, true];
        sub.last_success_at = Some(Timestamp::now_utc());

        let back = SubscriptionRow::from_subscription(&sub).into_subscription();

        assert_eq!(back, sub);
    }
}
