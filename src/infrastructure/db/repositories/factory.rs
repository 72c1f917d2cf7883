use std::sync::Arc;

use crate::infrastructure::db::memory::InMemorySubscriptionStore;
use crate::infrastructure::db::postgres::subscription_store_postgres::SubscriptionStorePostgres;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::repositories::subscription_repository::SubscriptionRepository;

#[derive(Clone)]
pub struct Repositories {
    pub db: Option<Arc<PostgresDatabase>>,
    pub subscription: Arc<SubscriptionRepository>,
}

impl Repositories {
    /// Build repositories backed by Postgres stores.
    pub fn postgres(db: Arc<PostgresDatabase>) -> Self {
        let subscription_store = Arc::new(SubscriptionStorePostgres::new(db.clone()));
        Self {
            db: Some(db),
            subscription: Arc::new(SubscriptionRepository::new(subscription_store)),
        }
    }

    /// Build repositories backed by process-local stores.
    pub fn in_memory() -> Self {
        Self {
            db: None,
            subscription: Arc::new(SubscriptionRepository::new(Arc::new(
                InMemorySubscriptionStore::new(),
            ))),
        }
    }

    /// Readiness check across all backing stores.
    pub async fn ready(&self) -> bool {
        self.subscription.ping().await.is_ok()
    }
}
