//! Typed CRUD over a [`DocumentStore`].

use std::marker::PhantomData;

use chrono::Utc;
use serde_json::Value;

use crate::{errors::StoreError, id::new_document_id, store::DocumentStore, types::{Model, ModelDescriptor}};

/// Typed access to the documents of one model's collection.
///
/// The repository holds no connection; every call takes the store handle so the
/// caller controls its lifetime.
pub struct Repo<T>
where
    T: Model,
{
    descriptor: ModelDescriptor,
    _marker: PhantomData<T>,
}

impl<T> Default for Repo<T>
where
    T: Model,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Repo<T>
where
    T: Model,
{
    pub fn new() -> Self {
        Self {
            descriptor: T::descriptor(),
            _marker: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn collection(&self) -> &'static str {
        self.descriptor.collection
    }

    pub async fn get(&self, store: &mut dyn DocumentStore, id: &str) -> Result<Option<T>, StoreError> {
        match store.get(self.collection(), id).await? {
            Some(document) => self.decode(id, document).map(Some),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, store: &mut dyn DocumentStore, id: &str) -> Result<bool, StoreError> {
        Ok(store.get(self.collection(), id).await?.is_some())
    }

    pub async fn find_all(&self, store: &mut dyn DocumentStore) -> Result<Vec<T>, StoreError> {
        let documents = store.scan(self.collection()).await?;
        documents
            .into_iter()
            .map(|document| {
                let id = document_id(&self.descriptor, &document);
                self.decode(&id, document)
            })
            .collect()
    }

    /// First document whose `field` equals `value`.
    pub async fn find_by(
        &self,
        store: &mut dyn DocumentStore,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Option<T>, StoreError> {
        let value = value.into();
        let documents = store.scan(self.collection()).await?;
        match documents.into_iter().find(|document| document.get(field) == Some(&value)) {
            Some(document) => {
                let id = document_id(&self.descriptor, &document);
                self.decode(&id, document).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Every document whose `field` equals `value`.
    pub async fn filter_by(
        &self,
        store: &mut dyn DocumentStore,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<T>, StoreError> {
        let value = value.into();
        let documents = store.scan(self.collection()).await?;
        documents
            .into_iter()
            .filter(|document| document.get(field) == Some(&value))
            .map(|document| {
                let id = document_id(&self.descriptor, &document);
                self.decode(&id, document)
            })
            .collect()
    }

    pub async fn count(&self, store: &mut dyn DocumentStore) -> Result<u64, StoreError> {
        Ok(store.scan(self.collection()).await?.len() as u64)
    }

    /// Insert a new document.
    ///
    /// An empty id is replaced with a generated one and both timestamps are set.
    /// Fails with [`StoreError::DuplicateKey`] when the id or a natural key value
    /// is already held by another document.
    pub async fn create(&self, store: &mut dyn DocumentStore, mut entity: T) -> Result<T, StoreError> {
        if entity.id().is_empty() {
            entity.set_id(new_document_id());
        } else if self.exists(store, entity.id()).await? {
            return Err(StoreError::DuplicateKey {
                collection: self.collection().to_string(),
                field: self.descriptor.id_field.to_string(),
                value: entity.id().to_string(),
                existing_id: entity.id().to_string(),
            });
        }
        entity.stamp(Utc::now(), true);

        let document = self.encode(&entity)?;
        self.check_natural_keys(store, entity.id(), &document).await?;
        store.put(self.collection(), entity.id(), &document).await?;
        Ok(entity)
    }

    /// Overwrite an existing document and refresh its update timestamp.
    pub async fn update(&self, store: &mut dyn DocumentStore, mut entity: T) -> Result<T, StoreError> {
        if !self.exists(store, entity.id()).await? {
            return Err(StoreError::NotFound {
                collection: self.collection().to_string(),
                id: entity.id().to_string(),
            });
        }
        entity.stamp(Utc::now(), false);

        let document = self.encode(&entity)?;
        self.check_natural_keys(store, entity.id(), &document).await?;
        store.put(self.collection(), entity.id(), &document).await?;
        Ok(entity)
    }

    pub async fn delete(&self, store: &mut dyn DocumentStore, id: &str) -> Result<bool, StoreError> {
        store.delete(self.collection(), id).await
    }

    /// Delete every document whose `field` equals `value`. Returns how many were removed.
    pub async fn delete_by(
        &self,
        store: &mut dyn DocumentStore,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<usize, StoreError> {
        let value = value.into();
        let ids: Vec<String> = store
            .scan(self.collection())
            .await?
            .iter()
            .filter(|document| document.get(field) == Some(&value))
            .map(|document| document_id(&self.descriptor, document))
            .collect();

        let mut removed = 0;
        for id in ids {
            if store.delete(self.collection(), &id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn check_natural_keys(
        &self,
        store: &mut dyn DocumentStore,
        id: &str,
        document: &Value,
    ) -> Result<(), StoreError> {
        if self.descriptor.natural_keys.is_empty() {
            return Ok(());
        }

        let existing = store.scan(self.collection()).await?;
        for field in self.descriptor.natural_keys {
            let Some(value) = document.get(*field).filter(|value| !value.is_null()) else {
                continue;
            };
            let clash = existing.iter().find(|other| {
                other.get(*field) == Some(value) && document_id(&self.descriptor, other) != id
            });
            if let Some(other) = clash {
                return Err(StoreError::DuplicateKey {
                    collection: self.collection().to_string(),
                    field: (*field).to_string(),
                    value: display_value(value),
                    existing_id: document_id(&self.descriptor, other),
                });
            }
        }
        Ok(())
    }

    fn encode(&self, entity: &T) -> Result<Value, StoreError> {
        serde_json::to_value(entity).map_err(|source| StoreError::Encode {
            collection: self.collection().to_string(),
            source,
        })
    }

    fn decode(&self, id: &str, document: Value) -> Result<T, StoreError> {
        serde_json::from_value(document).map_err(|source| StoreError::Decode {
            key: format!("{}:{}", self.collection(), id),
            source,
        })
    }
}

fn document_id(descriptor: &ModelDescriptor, document: &Value) -> String {
    document
        .get(descriptor.id_field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Model, store::MemoryStore};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Model, Serialize, Deserialize, Debug, Clone, PartialEq)]
    #[coach(collection = "widgets", register = false)]
    struct Widget {
        #[coach(id)]
        id: String,
        #[coach(unique)]
        code: i32,
        name: String,
        #[coach(created_at)]
        created_at: DateTime<Utc>,
        #[coach(updated_at)]
        updated_at: DateTime<Utc>,
    }

    fn widget(code: i32, name: &str) -> Widget {
        Widget {
            id: String::new(),
            code,
            name: name.to_string(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let mut store = MemoryStore::new();
        let repo = Repo::<Widget>::new();

        let created = repo.create(&mut store, widget(1, "gear")).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(created.created_at > DateTime::<Utc>::default());
        assert_eq!(created.created_at, created.updated_at);

        let fetched = repo.get(&mut store, &created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_natural_key() {
        let mut store = MemoryStore::new();
        let repo = Repo::<Widget>::new();

        let first = repo.create(&mut store, widget(7, "gear")).await.unwrap();
        let err = repo.create(&mut store, widget(7, "cog")).await.unwrap_err();
        match err {
            StoreError::DuplicateKey {
                field, value, existing_id, ..
            } => {
                assert_eq!(field, "code");
                assert_eq!(value, "7");
                assert_eq!(existing_id, first.id);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(repo.count(&mut store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn find_and_delete_by_field() {
        let mut store = MemoryStore::new();
        let repo = Repo::<Widget>::new();
        repo.create(&mut store, widget(1, "gear")).await.unwrap();
        repo.create(&mut store, widget(2, "cog")).await.unwrap();

        let found = repo.find_by(&mut store, "code", 2).await.unwrap().unwrap();
        assert_eq!(found.name, "cog");
        assert!(repo.find_by(&mut store, "code", 3).await.unwrap().is_none());

        assert_eq!(repo.delete_by(&mut store, "name", "gear").await.unwrap(), 1);
        assert_eq!(repo.find_all(&mut store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_requires_existing_document() {
        let mut store = MemoryStore::new();
        let repo = Repo::<Widget>::new();

        let mut ghost = widget(9, "ghost");
        ghost.id = "missing".to_string();
        assert!(matches!(
            repo.update(&mut store, ghost).await,
            Err(StoreError::NotFound { .. })
        ));

        let mut created = repo.create(&mut store, widget(3, "gear")).await.unwrap();
        let created_at = created.created_at;
        created.name = "sprocket".to_string();
        let updated = repo.update(&mut store, created).await.unwrap();
        assert_eq!(updated.created_at, created_at);
        assert!(updated.updated_at >= created_at);
        assert_eq!(repo.filter_by(&mut store, "name", "sprocket").await.unwrap().len(), 1);
    }
}
