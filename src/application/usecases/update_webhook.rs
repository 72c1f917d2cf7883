// Use case: update_webhook.

use tracing::{info, instrument};

use crate::application::context::AppContext;
use crate::application::usecases::register_webhook::normalize_events;
use crate::domain::entities::subscription::{SubscriptionPatch, SubscriptionView};
use crate::domain::services::url_guard::{UrlValidationError, validate_webhook_url};
use crate::domain::value_objects::ids::{OwnerId, SubscriptionId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::infrastructure::db::stores::subscription_store::SubscriptionRepositoryError;

/// Applies an owner edit to an existing subscription.
pub struct UpdateWebhookUseCase;

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateWebhookError {
    NotFound,
    InvalidUrl(UrlValidationError),
    Validation(String),
    Storage(String),
}

#[derive(Debug, Clone, Default)]
pub struct UpdateWebhookCommand {
    pub url: Option<String>,
    pub secret: Option<String>,
    pub events: Option<Vec<String>>,
    pub description: Option<Option<String>>,
    pub active: Option<bool>,
}

impl UpdateWebhookUseCase {
    #[instrument(skip(ctx, cmd))]
    pub async fn execute(
        ctx: &AppContext,
        owner_id: OwnerId,
        id: SubscriptionId,
        cmd: UpdateWebhookCommand,
    ) -> Result<SubscriptionView, UpdateWebhookError> {
        // Step 1: Validate supplied fields with the registration rules.
        let url = match cmd.url {
            Some(raw) => Some(
                validate_webhook_url(&raw)
                    .map_err(UpdateWebhookError::InvalidUrl)?
                    .to_string(),
            ),
            None => None,
        };
        if cmd.secret.as_deref() == Some("") {
            return Err(UpdateWebhookError::Validation(
                "secret must not be empty".to_string(),
            ));
        }
        let events = match cmd.events {
            Some(events) => {
                let events = normalize_events(events);
                if events.is_empty() {
                    return Err(UpdateWebhookError::Validation(
                        "events must not be empty".to_string(),
                    ));
                }
                Some(events)
            }
            None => None,
        };

        // Step 2: Apply atomically under the ownership check.
        let patch = SubscriptionPatch {
            url,
            secret: cmd.secret,
            events,
            description: cmd.description,
            active: cmd.active,
        };
        let stored = ctx
            .repos
            .subscription
            .apply_patch(owner_id, id, patch, Timestamp::now_utc())
            .await
            .map_err(|e| match e {
                SubscriptionRepositoryError::NotFound => UpdateWebhookError::NotFound,
                _ => UpdateWebhookError::Storage(format!("{e:?}")),
            })?;

        info!(
            subscription_id = %stored.id,
            owner_id = %stored.owner_id,
            active = stored.active,
            "webhook_updated"
        );

        Ok(stored.view())
    }
}
