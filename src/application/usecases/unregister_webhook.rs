// Use case: unregister_webhook.

use tracing::{info, instrument};

use crate::application::context::AppContext;
use crate::domain::value_objects::ids::{OwnerId, SubscriptionId};
use crate::infrastructure::db::stores::subscription_store::SubscriptionRepositoryError;

/// Permanently removes a subscription owned by the caller.
pub struct UnregisterWebhookUseCase;

#[derive(Debug, Clone, PartialEq)]
pub enum UnregisterWebhookError {
    NotFound,
    Storage(String),
}

impl UnregisterWebhookUseCase {
    #[instrument(skip(ctx))]
    pub async fn execute(
        ctx: &AppContext,
        owner_id: OwnerId,
        id: SubscriptionId,
    ) -> Result<(), UnregisterWebhookError> {
        // Step 1: Attempt delete in storage.
        let result = ctx.repos.subscription.delete(owner_id, id).await;

        // Step 2: Map storage errors to use case errors.
        match result {
            Ok(()) => {
                info!(subscription_id = %id, owner_id = %owner_id, "webhook_deleted");
                Ok(())
            }
            Err(SubscriptionRepositoryError::NotFound) => Err(UnregisterWebhookError::NotFound),
            Err(err) => Err(UnregisterWebhookError::Storage(format!("{err:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{UnregisterWebhookError, UnregisterWebhookUseCase};
    use crate::application::context::test_support::{
        ScriptedTransport, test_context, unavailable_context,
    };
    use crate::domain::entities::subscription::Subscription;
    use crate::domain::value_objects::ids::{OwnerId, SubscriptionId};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn subscription(owner: OwnerId) -> Subscription {
        Subscription::new(
            owner,
            "https://example.com/webhook".to_string(),
            "s1".to_string(),
            BTreeSet::from(["entry.created".to_string()]),
            None,
        )
    }

    #[tokio::test]
    async fn given_owned_webhook_when_delete_should_remove_it() {
        let ctx = test_context();
        let owner = OwnerId::new();
        let sub = ctx.repos.subscription.insert(&subscription(owner)).await.unwrap();

        UnregisterWebhookUseCase::execute(&ctx, owner, sub.id).await.unwrap();

        assert!(ctx.repos.subscription.get(owner, sub.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn given_other_owner_when_delete_should_return_not_found_and_keep_it() {
        let ctx = test_context();
        let owner = OwnerId::new();
        let sub = ctx.repos.subscription.insert(&subscription(owner)).await.unwrap();

        let err = UnregisterWebhookUseCase::execute(&ctx, OwnerId::new(), sub.id)
            .await
            .unwrap_err();

        assert_eq!(err, UnregisterWebhookError::NotFound);
        assert!(ctx.repos.subscription.get(owner, sub.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn given_unknown_id_when_delete_should_return_not_found() {
        let ctx = test_context();

        let err = UnregisterWebhookUseCase::execute(&ctx, OwnerId::new(), SubscriptionId::new())
            .await
            .unwrap_err();

        assert_eq!(err, UnregisterWebhookError::NotFound);
    }

    #[tokio::test]
    async fn given_storage_unavailable_when_delete_should_return_storage_error() {
        let ctx = unavailable_context(Arc::new(ScriptedTransport::always(200)));

        let err = UnregisterWebhookUseCase::execute(&ctx, OwnerId::new(), SubscriptionId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, UnregisterWebhookError::Storage(_)));
    }
}
