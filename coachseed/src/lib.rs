//! coachseed: collection bootstrap and seed migrations for the coaching platform.
//!
//! The crate is split into a storage layer ([`store`]), a typed model layer
//! ([`types`], [`registry`], [`repository`], [`models`]), the migration engine
//! ([`migrate`]) and the built-in seed migrations ([`seeds`]).
//!
//! ```ignore
//! let mut store = RedisStore::connect("redis://127.0.0.1/", "coach").await?;
//! let registry = MigrationRegistry::builtin()?;
//! let mut runner = MigrationRunner::new(&mut store, &registry);
//! let report = runner.run().await;
//! println!("{} applied, {} failed", report.applied(), report.failed());
//! ```

extern crate self as coachseed;

pub mod config;
pub mod errors;
pub mod id;
pub mod keys;
pub mod migrate;
pub mod models;
pub mod password;
pub mod registry;
pub mod repository;
pub mod seeds;
pub mod store;
pub mod types;
pub mod validators;

pub use coachseed_macros::Model;
pub use config::Settings;
pub use errors::*;
pub use migrate::{
    CollectionInitializer, CollectionReport, Migration, MigrationContext, MigrationLog, MigrationOutcome,
    MigrationRecord, MigrationRegistration, MigrationRegistry, MigrationRunner, MigrationStatus, OutcomeKind,
    PlannedMigration, Resolution, RollbackOutcome, RunReport, SeedWarning,
};
pub use repository::Repo;
pub use store::{DocumentStore, IndexSync, MemoryStore, RedisStore};
pub use types::{IndexField, IndexKind, Model, ModelDescriptor};

// Re-exported for code emitted by `#[derive(Model)]` and for migration authors.
pub use async_trait::async_trait;
pub use chrono;
pub use inventory;
pub use redis;
pub use redis::aio::ConnectionManager;
