use crate::domain::entities::subscription::SubscriptionPatch;
use crate::domain::workflows::reliability::{ReliabilityPolicy, ReliabilityUpdate};
use crate::infrastructure::db::database::DatabaseError;
use crate::infrastructure::db::dto::SubscriptionRow;
use async_trait::async_trait;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionRepositoryError {
    NotFound,
    Conflict,
    StorageUnavailable,
}

impl From<DatabaseError> for SubscriptionRepositoryError {
    fn from(_: DatabaseError) -> Self {
        SubscriptionRepositoryError::StorageUnavailable
    }
}

/// Durable record of subscriptions, keyed by `(owner_id, id)`.
///
/// Every lookup is owner-scoped: a subscription owned by someone else is
/// indistinguishable from one that does not exist.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Create a subscription and return exactly what was stored.
    async fn insert(&self, row: &SubscriptionRow)
        -> Result<SubscriptionRow, SubscriptionRepositoryError>;
    /// Fetch one subscription owned by `owner_id`. Returns `None` otherwise.
    async fn get(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<Option<SubscriptionRow>, SubscriptionRepositoryError>;
    /// All subscriptions owned by `owner_id`, oldest first.
    async fn list_by_owner(
        &self,
        owner_id: uuid::Uuid,
    ) -> Result<Vec<SubscriptionRow>, SubscriptionRepositoryError>;
    /// Atomically apply an owner edit. `NotFound` when not owned by `owner_id`.
    async fn apply_patch(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
        patch: SubscriptionPatch,
        now: OffsetDateTime,
    ) -> Result<SubscriptionRow, SubscriptionRepositoryError>;
    /// Hard-delete. `NotFound` when not owned by `owner_id`.
    async fn delete(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<(), SubscriptionRepositoryError>;
    /// Atomically record one delivery outcome and evaluate auto-disable.
    async fn record_delivery(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
        success: bool,
        now: OffsetDateTime,
        policy: &ReliabilityPolicy,
    ) -> Result<(SubscriptionRow, ReliabilityUpdate), SubscriptionRepositoryError>;
    /// Liveness check of the backing storage.
    async fn ping(&self) -> Result<(), SubscriptionRepositoryError>;
}
