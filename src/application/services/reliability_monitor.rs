use metrics::counter;
use tracing::{error, warn};

use crate::application::context::AppContext;
use crate::domain::entities::subscription::{DeliveryResult, Subscription};
use crate::domain::value_objects::timestamps::Timestamp;

/// Records completed deliveries against subscription statistics.
pub struct ReliabilityMonitor;

impl ReliabilityMonitor {
    /// Apply one delivery result. Returns the stored subscription when the
    /// update was persisted, `None` when the store could not be updated.
    pub async fn record(
        ctx: &AppContext,
        subscription: &Subscription,
        result: &DeliveryResult,
        now: Timestamp,
    ) -> Option<Subscription> {
        let policy = ctx.reliability_policy();

        // Step 1: Atomic read-modify-write in the store.
        let recorded = ctx
            .repos
            .subscription
            .record_delivery(
                subscription.owner_id,
                subscription.id,
                result.success,
                now,
                &policy,
            )
            .await;

        match recorded {
            Ok((stored, update)) => {
                // Step 2: Surface transitions for operators.
                if update.disabled_now {
                    counter!("webhook_subscriptions_disabled_total").increment(1);
                    warn!(
                        subscription_id = %stored.id,
                        owner_id = %stored.owner_id,
                        failure_rate = update.failure_rate,
                        "webhook_subscription_auto_disabled"
                    );
                }
                Some(stored)
            }
            Err(err) => {
                error!(
                    subscription_id = %subscription.id,
                    owner_id = %subscription.owner_id,
                    error = ?err,
                    "webhook_stats_update_failed"
                );
                None
            }
        }
    }
}
