//! RedisJSON document store with RediSearch indexes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use log::debug;
use redis::{aio::ConnectionManager, cmd};
use serde_json::Value;

use super::{DocumentStore, IndexSync};
use crate::{errors::StoreError, keys::KeyContext, types::ModelDescriptor};

const SCAN_COUNT: usize = 500;

/// Document store backed by Redis with the RedisJSON and RediSearch modules.
///
/// The connection is opened by [`RedisStore::connect`] and released when the
/// store is dropped.
pub struct RedisStore {
    conn: ConnectionManager,
    keys: KeyContext,
}

impl RedisStore {
    /// Open a managed connection to the given Redis URL.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        let store = Self::new(conn, prefix);
        debug!("connected to redis (prefix '{}')", store.keys.prefix());
        Ok(store)
    }

    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            keys: KeyContext::new(prefix),
        }
    }

    pub fn keys(&self) -> &KeyContext {
        &self.keys
    }

    /// Get the Redis connection manager.
    pub fn conn(&mut self) -> &mut ConnectionManager {
        &mut self.conn
    }

    async fn scan_keys(&mut self, pattern: &str) -> Result<BTreeSet<String>, StoreError> {
        let mut cursor: u64 = 0;
        let mut found = BTreeSet::new();

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut self.conn)
                .await?;

            // SCAN may return a key more than once
            found.extend(keys);

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(found)
    }

    async fn read_json(&mut self, key: &str) -> Result<Option<Value>, StoreError> {
        let raw: Option<String> = cmd("JSON.GET").arg(key).query_async(&mut self.conn).await?;
        match raw {
            Some(json) => serde_json::from_str(&json).map(Some).map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            }),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn get(&mut self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let key = self.keys.document(collection, id);
        self.read_json(&key).await
    }

    async fn put(&mut self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError> {
        let key = self.keys.document(collection, id);
        let json = serde_json::to_string(document).map_err(|source| StoreError::Encode {
            collection: collection.to_string(),
            source,
        })?;

        let _: () = cmd("JSON.SET")
            .arg(&key)
            .arg("$")
            .arg(json)
            .query_async(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn delete(&mut self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let key = self.keys.document(collection, id);
        let removed: u64 = cmd("DEL").arg(&key).query_async(&mut self.conn).await?;
        Ok(removed > 0)
    }

    async fn scan(&mut self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let pattern = self.keys.collection_pattern(collection);
        let keys = self.scan_keys(&pattern).await?;

        let mut documents = Vec::with_capacity(keys.len());
        for key in keys {
            // Deleted between SCAN and JSON.GET
            if let Some(document) = self.read_json(&key).await? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    async fn collection_exists(&mut self, collection: &str) -> Result<bool, StoreError> {
        let exists: bool = cmd("SISMEMBER")
            .arg(self.keys.catalog())
            .arg(collection)
            .query_async(&mut self.conn)
            .await?;
        Ok(exists)
    }

    async fn create_collection(&mut self, collection: &str) -> Result<(), StoreError> {
        let _: u64 = cmd("SADD")
            .arg(self.keys.catalog())
            .arg(collection)
            .query_async(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn ensure_indexes(&mut self, descriptor: &ModelDescriptor) -> Result<IndexSync, StoreError> {
        if !descriptor.is_indexed() {
            return Ok(IndexSync::NotIndexed);
        }

        let index_name = self.keys.index(descriptor.collection);
        let indexes: Vec<String> = cmd("FT._LIST").query_async(&mut self.conn).await?;
        if indexes.iter().any(|name| name == &index_name) {
            return Ok(IndexSync::AlreadyPresent);
        }

        let mut command = cmd("FT.CREATE");
        command.arg(&index_name);
        command.arg("ON").arg("JSON");
        command.arg("PREFIX").arg(1).arg(self.keys.collection_prefix(descriptor.collection));
        command.arg("SCHEMA");
        for field in descriptor.indexes {
            command.arg(format!("$.{}", field.field));
            command.arg("AS").arg(field.field);
            command.arg(field.kind.as_schema_type());
            if field.sortable {
                command.arg("SORTABLE");
            }
        }

        if let Err(err) = command.query_async::<()>(&mut self.conn).await {
            if index_exists_error(&err) {
                return Ok(IndexSync::AlreadyPresent);
            }
            return Err(err.into());
        }

        debug!("created index {index_name}");
        Ok(IndexSync::Created)
    }

    fn describe(&self) -> String {
        format!("redis (prefix '{}')", self.keys.prefix())
    }
}

fn index_exists_error(err: &redis::RedisError) -> bool {
    let msg = err.to_string().to_ascii_lowercase();
    msg.contains("already exists") && msg.contains("index")
}
