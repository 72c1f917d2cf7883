// Use case: deliver_webhook.

use metrics::counter;
use tracing::{info, instrument};

use crate::application::context::AppContext;
use crate::application::services::delivery_executor::DeliveryExecutor;
use crate::application::services::reliability_monitor::ReliabilityMonitor;
use crate::domain::entities::subscription::{DeliveryResult, Subscription, WebhookPayload};
use crate::domain::value_objects::timestamps::Timestamp;

/// Delivers one event to one subscription with retries, then records the outcome.
///
/// Delivery failure is a normal return value; this never errors.
pub struct DeliverWebhookUseCase;

impl DeliverWebhookUseCase {
    #[instrument(
        skip_all,
        fields(subscription_id = %subscription.id, event = %payload.event)
    )]
    pub async fn execute(
        ctx: &AppContext,
        subscription: &Subscription,
        payload: &WebhookPayload,
    ) -> DeliveryResult {
        let policy = ctx.retry_policy();

        // Step 1: Sign once; every attempt sends the same bytes.
        let request = DeliveryExecutor::prepare(subscription, payload, ctx.user_agent());

        // Step 2: Attempt sequentially, waiting the backoff before each retry.
        let mut attempts = 0;
        let last = loop {
            attempts += 1;
            let delay = policy.delay_before(attempts);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = DeliveryExecutor::send(
                ctx.transport.as_ref(),
                subscription,
                request.clone(),
                attempts,
            )
            .await;
            if outcome.ok || !policy.can_retry(attempts) {
                break outcome;
            }
        };

        let result = DeliveryResult {
            success: last.ok,
            attempts,
            error: last.error,
            status_code: last.status_code,
        };

        let label = if result.success { "success" } else { "failure" };
        counter!("webhook_deliveries_total", "outcome" => label).increment(1);
        info!(
            subscription_id = %subscription.id,
            owner_id = %subscription.owner_id,
            event = %payload.event,
            attempts = result.attempts,
            success = result.success,
            status = result.status_code.unwrap_or_default(),
            "webhook_delivery_completed"
        );

        // Step 3: Update statistics and the auto-disable circuit.
        ReliabilityMonitor::record(ctx, subscription, &result, Timestamp::now_utc()).await;

        result
    }
}
