//! Document store access.
//!
//! - `DocumentStore` - object-safe async trait every backend implements
//! - `RedisStore` - RedisJSON documents with RediSearch indexes
//! - `MemoryStore` - in-process backend for tests and embedding

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{errors::StoreError, types::ModelDescriptor};

/// Result of synchronizing a collection's search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSync {
    Created,
    AlreadyPresent,
    /// The model declares no indexed fields.
    NotIndexed,
}

/// Handle to the document store, passed explicitly to everything that reads or writes.
///
/// Documents are JSON objects addressed by `(collection, id)`. All calls are
/// sequential suspension points; implementations need not be `Sync`.
#[async_trait]
pub trait DocumentStore: Send {
    async fn get(&mut self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Insert or overwrite the document stored under `id`.
    async fn put(&mut self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError>;

    /// Returns `true` if a document was removed.
    async fn delete(&mut self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Every document in the collection, in no particular order.
    async fn scan(&mut self, collection: &str) -> Result<Vec<Value>, StoreError>;

    async fn collection_exists(&mut self, collection: &str) -> Result<bool, StoreError>;

    async fn create_collection(&mut self, collection: &str) -> Result<(), StoreError>;

    /// Create the collection's search index when missing.
    async fn ensure_indexes(&mut self, descriptor: &ModelDescriptor) -> Result<IndexSync, StoreError>;

    /// Short human-readable description of the backend for reports.
    fn describe(&self) -> String;
}
