use crate::domain::entities::subscription::{Subscription, SubscriptionPatch};
use crate::domain::value_objects::ids::{OwnerId, SubscriptionId};
use crate::domain::value_objects::timestamps::Timestamp;
use crate::domain::workflows::reliability::{ReliabilityPolicy, ReliabilityUpdate};
use crate::infrastructure::db::dto::SubscriptionRow;
use crate::infrastructure::db::stores::subscription_store::{
    SubscriptionRepositoryError, SubscriptionStore,
};
use std::sync::Arc;

pub struct SubscriptionRepository {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionRepository {
    /// Build a repository that uses the given store implementation.
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Create a subscription and return what was actually stored.
    pub async fn insert(
        &self,
        sub: &Subscription,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        let dto = SubscriptionRow::from_subscription(sub);
        let stored = self.store.insert(&dto).await?;
        Ok(stored.into_subscription())
    }

    /// Fetch a subscription owned by `owner_id`. Returns `None` otherwise.
    pub async fn get(
        &self,
        owner_id: OwnerId,
        id: SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        let row = self
            .store
            .get(owner_id.as_uuid(), id.as_uuid())
            .await
            ?;
        Ok(row.map(SubscriptionRow::into_subscription))
    }

    /// All subscriptions owned by `owner_id`.
    pub async fn list_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        let rows = self
            .store
            .list_by_owner(owner_id.as_uuid())
            .await
            ?;
        Ok(rows.into_iter().map(SubscriptionRow::into_subscription).collect())
    }

    /// Apply an owner edit atomically and return the stored result.
    pub async fn apply_patch(
        &self,
        owner_id: OwnerId,
        id: SubscriptionId,
        patch: SubscriptionPatch,
        now: Timestamp,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        let stored = self
            .store
            .apply_patch(owner_id.as_uuid(), id.as_uuid(), patch, now.as_inner())
            .await
            ?;
        Ok(stored.into_subscription())
    }

    /// Delete a subscription owned by `owner_id`.
    pub async fn delete(
        &self,
        owner_id: OwnerId,
        id: SubscriptionId,
    ) -> Result<(), SubscriptionRepositoryError> {
        self.store
            .delete(owner_id.as_uuid(), id.as_uuid())
            .await
    }

    /// Record one delivery outcome atomically.
    pub async fn record_delivery(
        &self,
        owner_id: OwnerId,
        id: SubscriptionId,
        success: bool,
        now: Timestamp,
        policy: &ReliabilityPolicy,
    ) -> Result<(Subscription, ReliabilityUpdate), SubscriptionRepositoryError> {
        let (row, update) = self
            .store
            .record_delivery(owner_id.as_uuid(), id.as_uuid(), success, now.as_inner(), policy)
            .await
            ?;
        Ok((row.into_subscription(), update))
    }

    pub async fn ping(&self) -> Result<(), SubscriptionRepositoryError> {
        self.store.ping().await
    }
}
