//! Models pass: make sure every registered collection and its search index exist.

use log::{debug, warn};
use serde::Serialize;

use crate::{
    registry,
    store::{DocumentStore, IndexSync},
    types::ModelDescriptor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStage {
    Collection,
    Index,
}

/// Advisory failure for one collection. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionIssue {
    pub collection: String,
    pub stage: CollectionStage,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
    /// Collections whose search index was created during this pass.
    pub indexed: Vec<String>,
    pub issues: Vec<CollectionIssue>,
}

impl CollectionReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.existing.len()
    }
}

pub struct CollectionInitializer {
    descriptors: Vec<ModelDescriptor>,
}

impl CollectionInitializer {
    pub fn new(descriptors: Vec<ModelDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Every model registered through `#[derive(Model)]`.
    pub fn registered() -> Self {
        Self::new(registry::registered_descriptors())
    }

    pub async fn run(&self, store: &mut dyn DocumentStore) -> CollectionReport {
        let mut report = CollectionReport::default();

        for descriptor in &self.descriptors {
            let collection = descriptor.collection;

            let exists = match store.collection_exists(collection).await {
                Ok(exists) => exists,
                Err(err) => {
                    report.issue(collection, CollectionStage::Collection, err.to_string());
                    continue;
                }
            };

            if exists {
                report.existing.push(collection.to_string());
            } else if let Err(err) = store.create_collection(collection).await {
                report.issue(collection, CollectionStage::Collection, err.to_string());
                continue;
            } else {
                debug!("created collection {collection}");
                report.created.push(collection.to_string());
            }

            match store.ensure_indexes(descriptor).await {
                Ok(IndexSync::Created) => report.indexed.push(collection.to_string()),
                Ok(IndexSync::AlreadyPresent | IndexSync::NotIndexed) => {}
                Err(err) => report.issue(collection, CollectionStage::Index, err.to_string()),
            }
        }

        report
    }
}

impl CollectionReport {
    fn issue(&mut self, collection: &str, stage: CollectionStage, message: String) {
        warn!("collection {collection}: {message}");
        self.issues.push(CollectionIssue {
            collection: collection.to_string(),
            stage,
            message,
        });
    }
}
