//! Persisted records of applied migrations.

use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Model, errors::StoreError, repository::Repo, store::DocumentStore};

/// Marker that a migration has been applied. Keyed by the migration name.
#[derive(Model, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[coach(collection = "migrations")]
pub struct MigrationRecord {
    #[coach(id)]
    pub id: String,
    #[coach(unique, index(tag))]
    pub file_name: String,
    /// RFC 3339 application time.
    pub date: String,
    /// Creation counter; the highest value is the most recent record.
    #[coach(index(numeric, sortable))]
    pub sequence: u64,
    #[coach(created_at)]
    pub created_at: DateTime<Utc>,
    #[coach(updated_at)]
    pub updated_at: DateTime<Utc>,
}

/// Reads and writes the `migrations` collection.
#[derive(Default)]
pub struct MigrationLog {
    records: Repo<MigrationRecord>,
}

impl MigrationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find(&self, store: &mut dyn DocumentStore, name: &str) -> Result<Option<MigrationRecord>, StoreError> {
        self.records.get(store, name).await
    }

    pub async fn is_applied(&self, store: &mut dyn DocumentStore, name: &str) -> Result<bool, StoreError> {
        self.records.exists(store, name).await
    }

    /// All records, oldest first.
    pub async fn list(&self, store: &mut dyn DocumentStore) -> Result<Vec<MigrationRecord>, StoreError> {
        let mut records = self.records.find_all(store).await?;
        records.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(records)
    }

    /// The most recently created record.
    pub async fn latest(&self, store: &mut dyn DocumentStore) -> Result<Option<MigrationRecord>, StoreError> {
        Ok(self.list(store).await?.pop())
    }

    /// Log `name` as applied now.
    pub async fn record(&self, store: &mut dyn DocumentStore, name: &str) -> Result<MigrationRecord, StoreError> {
        let sequence = self
            .records
            .find_all(store)
            .await?
            .iter()
            .map(|record| record.sequence)
            .max()
            .unwrap_or(0)
            + 1;

        let now = Utc::now();
        let record = MigrationRecord {
            id: name.to_string(),
            file_name: name.to_string(),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            sequence,
            created_at: now,
            updated_at: now,
        };
        let record = self.records.create(store, record).await?;
        debug!("logged migration {name} (sequence {sequence})");
        Ok(record)
    }

    /// Returns `true` if a record was removed.
    pub async fn remove(&self, store: &mut dyn DocumentStore, name: &str) -> Result<bool, StoreError> {
        let removed = self.records.delete(store, name).await?;
        if removed {
            debug!("removed migration record {name}");
        }
        Ok(removed)
    }
}
