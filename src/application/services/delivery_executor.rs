use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::domain::entities::subscription::{AttemptOutcome, Subscription, WebhookPayload};
use crate::domain::services::signer;
use crate::infrastructure::transport::{TransportRequest, WebhookTransport};

pub const HEADER_EVENT: &str = "X-Webhook-Event";
pub const HEADER_ID: &str = "X-Webhook-ID";
pub const HEADER_SIGNATURE: &str = "X-Webhook-Signature";

/// Performs exactly one signed POST to a subscription endpoint.
pub struct DeliveryExecutor;

impl DeliveryExecutor {
    /// Serialize and sign `payload` once, producing the request every attempt reuses.
    pub fn prepare(
        subscription: &Subscription,
        payload: &WebhookPayload,
        user_agent: &str,
    ) -> TransportRequest {
        // Step 1: Serialize once; the signed bytes are the sent bytes.
        let body = signer::canonical_body(&payload.to_value());
        let signature = signer::sign_body(&subscription.secret, &body);

        // Step 2: Attach the delivery headers.
        TransportRequest {
            url: subscription.url.clone(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), user_agent.to_string()),
                (HEADER_EVENT.to_string(), payload.event.clone()),
                (HEADER_ID.to_string(), subscription.id.to_string()),
                (HEADER_SIGNATURE.to_string(), signature),
            ],
            body,
        }
    }

    /// Send a prepared request and classify the outcome. Never fails.
    pub async fn send(
        transport: &dyn WebhookTransport,
        subscription: &Subscription,
        request: TransportRequest,
        attempt: u32,
    ) -> AttemptOutcome {
        let start = std::time::Instant::now();
        let result = transport.post(request).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(response) if (200..300).contains(&response.status) => AttemptOutcome {
                ok: true,
                status_code: Some(response.status),
                error: None,
            },
            Ok(response) => AttemptOutcome {
                ok: false,
                status_code: Some(response.status),
                error: Some(format!("HTTP {}", response.status)),
            },
            Err(err) => AttemptOutcome {
                ok: false,
                status_code: None,
                error: Some(err.to_string()),
            },
        };

        let label = if outcome.ok { "success" } else { "failure" };
        counter!("webhook_delivery_attempts_total", "outcome" => label).increment(1);
        histogram!("webhook_delivery_attempt_duration_ms", "outcome" => label)
            .record(latency_ms as f64);

        if outcome.ok {
            debug!(
                subscription_id = %subscription.id,
                attempt,
                status = outcome.status_code.unwrap_or_default(),
                latency_ms,
                "webhook_attempt_succeeded"
            );
        } else {
            warn!(
                subscription_id = %subscription.id,
                attempt,
                status = outcome.status_code.unwrap_or_default(),
                error = outcome.error.as_deref().unwrap_or(""),
                latency_ms,
                "webhook_attempt_failed"
            );
        }

        outcome
    }

    /// One full attempt: prepare, sign, send.
    pub async fn attempt(
        transport: &dyn WebhookTransport,
        subscription: &Subscription,
        payload: &WebhookPayload,
        user_agent: &str,
    ) -> AttemptOutcome {
        let request = Self::prepare(subscription, payload, user_agent);
        Self::send(transport, subscription, request, 1).await
    }
}
