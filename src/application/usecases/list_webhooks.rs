// Use case: list_webhooks.

use tracing::instrument;

use crate::application::context::AppContext;
use crate::domain::entities::subscription::SubscriptionView;
use crate::domain::value_objects::ids::OwnerId;

/// Lists the caller's subscriptions with their delivery statistics.
pub struct ListWebhooksUseCase;

#[derive(Debug, Clone, PartialEq)]
pub enum ListWebhooksError {
    Storage(String),
}

impl ListWebhooksUseCase {
    #[instrument(skip(ctx))]
    pub async fn execute(
        ctx: &AppContext,
        owner_id: OwnerId,
    ) -> Result<Vec<SubscriptionView>, ListWebhooksError> {
        let subs = ctx
            .repos
            .subscription
            .list_by_owner(owner_id)
            .await
            .map_err(|e| ListWebhooksError::Storage(format!("{e:?}")))?;

        Ok(subs.iter().map(|s| s.view()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{ListWebhooksError, ListWebhooksUseCase};
    use crate::application::context::test_support::{
        ScriptedTransport, test_context, unavailable_context,
    };
    use crate::application::usecases::register_webhook::{
        RegisterWebhookCommand, RegisterWebhookUseCase,
    };
    use crate::domain::value_objects::ids::OwnerId;
    use std::sync::Arc;

    fn command(owner_id: OwnerId, secret: &str) -> RegisterWebhookCommand {
        RegisterWebhookCommand {
            owner_id,
            url: "https://example.com/webhook".to_string(),
            secret: secret.to_string(),
            events: vec!["entry.created".to_string()],
            description: Some("primary".to_string()),
        }
    }

    #[tokio::test]
    async fn given_two_owners_when_list_should_return_only_callers_webhooks() {
        let ctx = test_context();
        let alice = OwnerId::new();
        let bob = OwnerId::new();
        RegisterWebhookUseCase::execute(&ctx, command(alice, "a1")).await.unwrap();
        RegisterWebhookUseCase::execute(&ctx, command(alice, "a2")).await.unwrap();
        RegisterWebhookUseCase::execute(&ctx, command(bob, "b1")).await.unwrap();

        let listed = ListWebhooksUseCase::execute(&ctx, alice).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|v| v.owner_id == alice.to_string()));
    }

    #[tokio::test]
    async fn given_registered_webhooks_when_list_should_never_expose_secret() {
        let ctx = test_context();
        let owner = OwnerId::new();
        RegisterWebhookUseCase::execute(&ctx, command(owner, "super-secret-key"))
            .await
            .unwrap();

        let listed = ListWebhooksUseCase::execute(&ctx, owner).await.unwrap();

        let json = serde_json::to_string(&listed).unwrap();
        assert!(!json.contains("super-secret-key"));
        assert!(!json.contains("\"secret\""));
        assert!(json.contains("\"totalDeliveries\":0"));
    }

    #[tokio::test]
    async fn given_storage_unavailable_when_list_should_return_storage_error() {
        let ctx = unavailable_context(Arc::new(ScriptedTransport::always(200)));

        let err = ListWebhooksUseCase::execute(&ctx, OwnerId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ListWebhooksError::Storage(_)));
    }
}
