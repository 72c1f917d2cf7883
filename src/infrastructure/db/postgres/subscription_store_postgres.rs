use crate::domain::entities::subscription::SubscriptionPatch;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::domain::workflows::reliability::{ReliabilityPolicy, ReliabilityUpdate};
use crate::infrastructure::db::dto::SubscriptionRow;
use crate::infrastructure::db::postgres::PostgresDatabase;
use crate::infrastructure::db::stores::subscription_store::{
    SubscriptionRepositoryError, SubscriptionStore,
};
use async_trait::async_trait;
use sqlx::PgConnection;
use time::OffsetDateTime;

const COLUMNS: &str = "id,
                owner_id,
                url,
                secret,
                description,
                events,
                active,
                disabled_reason,
                total_deliveries,
                failed_deliveries,
                consecutive_failures,
                recent_outcomes,
                last_triggered_at,
                last_success_at,
                created_at,
                updated_at";

#[derive(Clone)]
pub struct SubscriptionStorePostgres {
    db: std::sync::Arc<PostgresDatabase>,
}

impl SubscriptionStorePostgres {
    /// Build a Postgres-backed subscription store.
    pub fn new(db: std::sync::Arc<PostgresDatabase>) -> Self {
        Self { db }
    }

    async fn get_impl_conn(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
        for_update: bool,
    ) -> Result<Option<SubscriptionRow>, SubscriptionRepositoryError> {
        let lock = if for_update { " FOR UPDATE" } else { "" };
        let sql = format!(
            "SELECT {COLUMNS} FROM webhook_subscriptions WHERE owner_id = $1 AND id = $2{lock}"
        );
        sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)
    }

    async fn list_impl_conn(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
    ) -> Result<Vec<SubscriptionRow>, SubscriptionRepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM webhook_subscriptions WHERE owner_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(owner_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)
    }

    async fn insert_impl_conn(
        conn: &mut PgConnection,
        row: &SubscriptionRow,
    ) -> Result<SubscriptionRow, SubscriptionRepositoryError> {
        let sql = format!(
            "INSERT INTO webhook_subscriptions ({COLUMNS})
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16)
            ON CONFLICT DO NOTHING
            RETURNING {COLUMNS}"
        );
        let stored = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(row.id)
            .bind(row.owner_id)
            .bind(&row.url)
            .bind(&row.secret)
            .bind(&row.description)
            .bind(&row.events)
            .bind(row.active)
            .bind(&row.disabled_reason)
            .bind(row.total_deliveries)
            .bind(row.failed_deliveries)
            .bind(row.consecutive_failures)
            .bind(&row.recent_outcomes)
            .bind(row.last_triggered_at)
            .bind(row.last_success_at)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)?;

        stored.ok_or(SubscriptionRepositoryError::Conflict)
    }

    async fn write_impl_conn(
        conn: &mut PgConnection,
        row: &SubscriptionRow,
    ) -> Result<SubscriptionRow, SubscriptionRepositoryError> {
        let sql = format!(
            "UPDATE webhook_subscriptions SET
                url = $3,
                secret = $4,
                description = $5,
                events = $6,
                active = $7,
                disabled_reason = $8,
                total_deliveries = $9,
                failed_deliveries = $10,
                consecutive_failures = $11,
                recent_outcomes = $12,
                last_triggered_at = $13,
                last_success_at = $14,
                updated_at = $15
            WHERE owner_id = $1 AND id = $2
            RETURNING {COLUMNS}"
        );
        let stored = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(row.owner_id)
            .bind(row.id)
            .bind(&row.url)
            .bind(&row.secret)
            .bind(&row.description)
            .bind(&row.events)
            .bind(row.active)
            .bind(&row.disabled_reason)
            .bind(row.total_deliveries)
            .bind(row.failed_deliveries)
            .bind(row.consecutive_failures)
            .bind(&row.recent_outcomes)
            .bind(row.last_triggered_at)
            .bind(row.last_success_at)
            .bind(row.updated_at)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)?;

        stored.ok_or(SubscriptionRepositoryError::NotFound)
    }

    async fn delete_impl_conn(
        conn: &mut PgConnection,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<(), SubscriptionRepositoryError> {
        let result = sqlx::query("DELETE FROM webhook_subscriptions WHERE owner_id = $1 AND id = $2")
            .bind(owner_id)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)?;

        if result.rows_affected() == 0 {
            return Err(SubscriptionRepositoryError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionStorePostgres {
    async fn insert(
        &self,
        row: &SubscriptionRow,
    ) -> Result<SubscriptionRow, SubscriptionRepositoryError> {
        let row = row.clone();
        self.db
            .with_conn(move |conn| {
                let row = row;
                Box::pin(async move { Self::insert_impl_conn(conn, &row).await })
            })
            .await
    }

    async fn get(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<Option<SubscriptionRow>, SubscriptionRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(Self::get_impl_conn(conn, owner_id, id, false)))
            .await
    }

    async fn list_by_owner(
        &self,
        owner_id: uuid::Uuid,
    ) -> Result<Vec<SubscriptionRow>, SubscriptionRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(Self::list_impl_conn(conn, owner_id)))
            .await
    }

    async fn apply_patch(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
        patch: SubscriptionPatch,
        now: OffsetDateTime,
    ) -> Result<SubscriptionRow, SubscriptionRepositoryError> {
        self.db
            .with_tx(move |tx| {
                Box::pin(async move {
                    // Step 1: Lock the row for the read-modify-write.
                    let Some(row) = Self::get_impl_conn(&mut **tx, owner_id, id, true).await?
                    else {
                        return Err(SubscriptionRepositoryError::NotFound);
                    };

                    // Step 2: Apply the edit and write it back.
                    let mut sub = row.into_subscription();
                    patch.apply_to(&mut sub, Timestamp::from(now));
                    Self::write_impl_conn(&mut **tx, &SubscriptionRow::from_subscription(&sub))
                        .await
                })
            })
            .await
    }

    async fn delete(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<(), SubscriptionRepositoryError> {
        self.db
            .with_conn(move |conn| Box::pin(Self::delete_impl_conn(conn, owner_id, id)))
            .await
    }

    async fn record_delivery(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
        success: bool,
        now: OffsetDateTime,
        policy: &ReliabilityPolicy,
    ) -> Result<(SubscriptionRow, ReliabilityUpdate), SubscriptionRepositoryError> {
        let policy = policy.clone();
        self.db
            .with_tx(move |tx| {
                Box::pin(async move {
                    // Step 1: Lock the row so concurrent deliveries serialize.
                    let Some(row) = Self::get_impl_conn(&mut **tx, owner_id, id, true).await?
                    else {
                        return Err(SubscriptionRepositoryError::NotFound);
                    };

                    // Step 2: Apply counters and the auto-disable policy.
                    let mut sub = row.into_subscription();
                    let update = policy.apply(&mut sub, success, Timestamp::from(now));

                    // Step 3: Persist inside the same transaction.
                    let stored =
                        Self::write_impl_conn(&mut **tx, &SubscriptionRow::from_subscription(&sub))
                            .await?;
                    Ok((stored, update))
                })
            })
            .await
    }

    async fn ping(&self) -> Result<(), SubscriptionRepositoryError> {
        self.db
            .with_conn(|conn| {
                Box::pin(async move {
                    sqlx::query("SELECT 1")
                        .execute(&mut *conn)
                        .await
                        .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)?;
                    Ok(())
                })
            })
            .await
    }
}
