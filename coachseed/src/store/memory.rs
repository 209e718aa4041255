use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentStore, IndexSync};
use crate::{errors::StoreError, types::ModelDescriptor};

/// In-process document store.
///
/// Documents are kept per collection in id order. Collections and indexes are
/// tracked the same way the Redis catalog tracks them, so the collection
/// initializer behaves identically against both backends.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, BTreeMap<String, Value>>,
    collections: BTreeSet<String>,
    indexes: BTreeSet<String>,
    failing_indexes: BTreeSet<String>,
    failing_collections: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make index synchronization fail for the given collection.
    pub fn with_failing_index(mut self, collection: impl Into<String>) -> Self {
        self.failing_indexes.insert(collection.into());
        self
    }

    /// Make collection creation fail for the given collection.
    pub fn with_failing_collection(mut self, collection: impl Into<String>) -> Self {
        self.failing_collections.insert(collection.into());
        self
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.documents.get(collection).map(BTreeMap::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.values().all(BTreeMap::is_empty)
    }

    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(String::as_str)
    }

    pub fn has_index(&self, collection: &str) -> bool {
        self.indexes.contains(collection)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&mut self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.documents.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn put(&mut self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError> {
        self.documents
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn delete(&mut self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .documents
            .get_mut(collection)
            .map(|docs| docs.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn scan(&mut self, collection: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .documents
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn collection_exists(&mut self, collection: &str) -> Result<bool, StoreError> {
        Ok(self.collections.contains(collection))
    }

    async fn create_collection(&mut self, collection: &str) -> Result<(), StoreError> {
        if self.failing_collections.contains(collection) {
            return Err(StoreError::Other {
                message: format!("collection creation rejected for '{collection}'").into(),
            });
        }
        self.collections.insert(collection.to_string());
        Ok(())
    }

    async fn ensure_indexes(&mut self, descriptor: &ModelDescriptor) -> Result<IndexSync, StoreError> {
        if !descriptor.is_indexed() {
            return Ok(IndexSync::NotIndexed);
        }
        if self.failing_indexes.contains(descriptor.collection) {
            return Err(StoreError::Other {
                message: format!("index creation rejected for '{}'", descriptor.collection).into(),
            });
        }
        if self.indexes.insert(descriptor.collection.to_string()) {
            Ok(IndexSync::Created)
        } else {
            Ok(IndexSync::AlreadyPresent)
        }
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IndexField, IndexKind};
    use serde_json::json;

    const INDEXED: ModelDescriptor = ModelDescriptor {
        type_name: "Widget",
        collection: "widgets",
        id_field: "id",
        natural_keys: &[],
        indexes: &[IndexField {
            field: "name",
            kind: IndexKind::Text,
            sortable: false,
        }],
    };

    #[tokio::test]
    async fn put_get_delete() {
        let mut store = MemoryStore::new();
        store.put("widgets", "w1", &json!({"id": "w1"})).await.unwrap();

        assert_eq!(store.get("widgets", "w1").await.unwrap(), Some(json!({"id": "w1"})));
        assert_eq!(store.len("widgets"), 1);
        assert!(store.delete("widgets", "w1").await.unwrap());
        assert!(!store.delete("widgets", "w1").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn scan_missing_collection_is_empty() {
        let mut store = MemoryStore::new();
        assert!(store.scan("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn index_sync_is_idempotent() {
        let mut store = MemoryStore::new();
        assert_eq!(store.ensure_indexes(&INDEXED).await.unwrap(), IndexSync::Created);
        assert_eq!(store.ensure_indexes(&INDEXED).await.unwrap(), IndexSync::AlreadyPresent);
        assert!(store.has_index("widgets"));
    }

    #[tokio::test]
    async fn failing_index_is_reported() {
        let mut store = MemoryStore::new().with_failing_index("widgets");
        assert!(store.ensure_indexes(&INDEXED).await.is_err());
        assert!(!store.has_index("widgets"));
    }

    #[tokio::test]
    async fn unindexed_models_are_skipped() {
        let mut store = MemoryStore::new();
        let plain = ModelDescriptor {
            indexes: &[],
            ..INDEXED
        };
        assert_eq!(store.ensure_indexes(&plain).await.unwrap(), IndexSync::NotIndexed);
    }
}
