use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::entities::subscription::SubscriptionPatch;
use crate::domain::value_objects::timestamps::Timestamp;
use crate::domain::workflows::reliability::{ReliabilityPolicy, ReliabilityUpdate};
use crate::infrastructure::db::dto::SubscriptionRow;
use crate::infrastructure::db::stores::subscription_store::{
    SubscriptionRepositoryError, SubscriptionStore,
};

type RowCell = Arc<Mutex<SubscriptionRow>>;

#[derive(Clone)]
struct Entry {
    owner_id: uuid::Uuid,
    row: RowCell,
}

/// Process-local store keyed by subscription id.
///
/// The index lock is held only to look up, insert or remove an entry. Each
/// subscription has its own mutex for read-modify-write, so updates to
/// different subscriptions never wait on each other. No lock is held across
/// an await point.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    index: RwLock<HashMap<uuid::Uuid, Entry>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner-scoped lookup; another owner's row reads as missing.
    fn entry(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<Option<RowCell>, SubscriptionRepositoryError> {
        let index = self
            .index
            .read()
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)?;
        Ok(index
            .get(&id)
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.row.clone()))
    }

    fn update<T>(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
        f: impl FnOnce(&mut SubscriptionRow) -> T,
    ) -> Result<T, SubscriptionRepositoryError> {
        let cell = self
            .entry(owner_id, id)?
            .ok_or(SubscriptionRepositoryError::NotFound)?;
        let mut row = cell
            .lock()
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)?;
        Ok(f(&mut row))
    }
}

fn snapshot(cell: &RowCell) -> Result<SubscriptionRow, SubscriptionRepositoryError> {
    cell.lock()
        .map(|row| row.clone())
        .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn insert(
        &self,
        row: &SubscriptionRow,
    ) -> Result<SubscriptionRow, SubscriptionRepositoryError> {
        let mut index = self
            .index
            .write()
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)?;
        if index.contains_key(&row.id) {
            return Err(SubscriptionRepositoryError::Conflict);
        }
        index.insert(
            row.id,
            Entry {
                owner_id: row.owner_id,
                row: Arc::new(Mutex::new(row.clone())),
            },
        );
        Ok(row.clone())
    }

    async fn get(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<Option<SubscriptionRow>, SubscriptionRepositoryError> {
        match self.entry(owner_id, id)? {
            Some(cell) => snapshot(&cell).map(Some),
            None => Ok(None),
        }
    }

    async fn list_by_owner(
        &self,
        owner_id: uuid::Uuid,
    ) -> Result<Vec<SubscriptionRow>, SubscriptionRepositoryError> {
        let cells: Vec<RowCell> = {
            let index = self
                .index
                .read()
                .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)?;
            index
                .values()
                .filter(|entry| entry.owner_id == owner_id)
                .map(|entry| entry.row.clone())
                .collect()
        };
        let mut rows = cells
            .iter()
            .map(snapshot)
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn apply_patch(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
        patch: SubscriptionPatch,
        now: OffsetDateTime,
    ) -> Result<SubscriptionRow, SubscriptionRepositoryError> {
        self.update(owner_id, id, |row| {
            let mut sub = row.clone().into_subscription();
            patch.apply_to(&mut sub, Timestamp::from(now));
            *row = SubscriptionRow::from_subscription(&sub);
            row.clone()
        })
    }

    async fn delete(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
    ) -> Result<(), SubscriptionRepositoryError> {
        let mut index = self
            .index
            .write()
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)?;
        match index.get(&id) {
            Some(entry) if entry.owner_id == owner_id => {
                index.remove(&id);
                Ok(())
            }
            _ => Err(SubscriptionRepositoryError::NotFound),
        }
    }

    async fn record_delivery(
        &self,
        owner_id: uuid::Uuid,
        id: uuid::Uuid,
        success: bool,
        now: OffsetDateTime,
        policy: &ReliabilityPolicy,
    ) -> Result<(SubscriptionRow, ReliabilityUpdate), SubscriptionRepositoryError> {
        self.update(owner_id, id, |row| {
            let mut sub = row.clone().into_subscription();
            let update = policy.apply(&mut sub, success, Timestamp::from(now));
            *row = SubscriptionRow::from_subscription(&sub);
            (row.clone(), update)
        })
    }

    async fn ping(&self) -> Result<(), SubscriptionRepositoryError> {
        self.index
            .read()
            .map(|_| ())
            .map_err(|_| SubscriptionRepositoryError::StorageUnavailable)
    }
}
