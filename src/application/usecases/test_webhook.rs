// Use case: test_webhook.

use tracing::{info, instrument};

use crate::application::context::AppContext;
use crate::application::services::delivery_executor::DeliveryExecutor;
use crate::domain::entities::subscription::{AttemptOutcome, WebhookPayload};
use crate::domain::value_objects::ids::{OwnerId, SubscriptionId};

/// Sends one synthetic `test` event to a subscription endpoint.
///
/// Exactly one attempt, no retry, and statistics are left untouched.
pub struct TestWebhookUseCase;

#[derive(Debug, Clone, PartialEq)]
pub enum TestWebhookError {
    NotFound,
    Storage(String),
}

impl TestWebhookUseCase {
    #[instrument(skip(ctx))]
    pub async fn execute(
        ctx: &AppContext,
        owner_id: OwnerId,
        id: SubscriptionId,
    ) -> Result<AttemptOutcome, TestWebhookError> {
        // Step 1: Load the subscription under the ownership check.
        let sub = ctx
            .repos
            .subscription
            .get(owner_id, id)
            .await
            .map_err(|e| TestWebhookError::Storage(format!("{e:?}")))?
            .ok_or(TestWebhookError::NotFound)?;

        // Step 2: One attempt with the synthetic payload.
        let outcome = DeliveryExecutor::attempt(
            ctx.transport.as_ref(),
            &sub,
            &WebhookPayload::test(),
            ctx.user_agent(),
        )
        .await;

        info!(
            subscription_id = %sub.id,
            owner_id = %sub.owner_id,
            ok = outcome.ok,
            status = outcome.status_code.unwrap_or_default(),
            "webhook_test_sent"
        );

        Ok(outcome)
    }
}
