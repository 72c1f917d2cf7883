// Use case: register_webhook.

use std::collections::BTreeSet;

use tracing::{info, instrument};

use crate::application::context::AppContext;
use crate::domain::entities::subscription::{Subscription, SubscriptionView};
use crate::domain::services::url_guard::{UrlValidationError, validate_webhook_url};
use crate::domain::value_objects::ids::OwnerId;
use crate::infrastructure::db::stores::subscription_store::SubscriptionRepositoryError;

/// Registers an HTTPS endpoint for a set of event names.
pub struct RegisterWebhookUseCase;

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterWebhookError {
    InvalidUrl(UrlValidationError),
    Validation(String),
    Conflict,
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct RegisterWebhookCommand {
    pub owner_id: OwnerId,
    pub url: String,
    pub secret: String,
    pub events: Vec<String>,
    pub description: Option<String>,
}

/// Trim event names and drop blanks and duplicates.
pub(crate) fn normalize_events(events: Vec<String>) -> BTreeSet<String> {
    events
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

impl RegisterWebhookUseCase {
    /// Validate and persist a new subscription. The returned view never carries the secret.
    #[instrument(skip_all, fields(owner_id = %cmd.owner_id))]
    pub async fn execute(
        ctx: &AppContext,
        cmd: RegisterWebhookCommand,
    ) -> Result<SubscriptionView, RegisterWebhookError> {
        // Step 1: Validate everything before touching storage.
        let url = validate_webhook_url(&cmd.url).map_err(RegisterWebhookError::InvalidUrl)?;
        if cmd.secret.is_empty() {
            return Err(RegisterWebhookError::Validation(
                "secret must not be empty".to_string(),
            ));
        }
        let events = normalize_events(cmd.events);
        if events.is_empty() {
            return Err(RegisterWebhookError::Validation(
                "events must not be empty".to_string(),
            ));
        }

        // Step 2: Build the subscription with zeroed counters.
        let sub = Subscription::new(
            cmd.owner_id,
            url.to_string(),
            cmd.secret,
            events,
            cmd.description,
        );

        // Step 3: Persist it.
        let stored = ctx.repos.subscription.insert(&sub).await.map_err(|e| match e {
            SubscriptionRepositoryError::Conflict => RegisterWebhookError::Conflict,
            _ => RegisterWebhookError::Storage(format!("{e:?}")),
        })?;

        info!(
            subscription_id = %stored.id,
            owner_id = %stored.owner_id,
            events = stored.events.len(),
            "webhook_registered"
        );

        // Step 4: Return the public projection.
        Ok(stored.view())
    }
}
