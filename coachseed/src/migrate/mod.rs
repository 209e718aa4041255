//! Migration engine.
//!
//! - [`Migration`] - one named, ordered unit with `up` and optional `down`
//! - [`MigrationRegistry`] - every migration submitted through `inventory`, validated and ordered
//! - [`MigrationLog`] - persisted records of applied migrations
//! - [`CollectionInitializer`] - models pass creating collections and search indexes
//! - [`MigrationRunner`] - apply, dry-run, rollback, status and resolve

mod collections;
mod history;
mod report;
mod runner;

pub use collections::{CollectionInitializer, CollectionIssue, CollectionReport, CollectionStage};
pub use history::{MigrationLog, MigrationRecord};
pub use report::{
    MigrationOutcome, MigrationStatus, OutcomeKind, PlannedMigration, RollbackOutcome, RunReport, SeedWarning,
};
pub use runner::{MigrationRunner, Resolution};

use std::{cmp::Ordering, collections::HashSet};

use async_trait::async_trait;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{errors::MigrationError, store::DocumentStore};

static MIGRATION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-(.+)$").expect("migration name pattern is valid"));

/// A named, ordered unit of one-time setup or seeding logic.
///
/// Names follow `<order>-<description>`; migrations run in ascending numeric
/// order with the full name breaking ties.
#[async_trait]
pub trait Migration: Send + Sync {
    fn name(&self) -> &'static str;

    /// Migrations that must already be logged before this one may run.
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    async fn up(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError>;

    /// Revert `up`. Migrations that cannot be reverted keep the default.
    async fn down(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let _ = ctx;
        Err(MigrationError::MissingDown {
            name: self.name().to_string(),
        })
    }
}

/// Handle passed to a running migration.
pub struct MigrationContext<'a> {
    store: &'a mut dyn DocumentStore,
    migration: &'static str,
    warnings: Vec<SeedWarning>,
}

impl<'a> MigrationContext<'a> {
    pub fn new(store: &'a mut dyn DocumentStore, migration: &'static str) -> Self {
        Self {
            store,
            migration,
            warnings: Vec::new(),
        }
    }

    pub fn store(&mut self) -> &mut dyn DocumentStore {
        &mut *self.store
    }

    /// Name of the running migration.
    pub fn migration(&self) -> &'static str {
        self.migration
    }

    /// Record that one item was skipped. The migration itself carries on.
    pub fn warn(&mut self, item: impl Into<String>, message: impl Into<String>) {
        let warning = SeedWarning {
            migration: self.migration.to_string(),
            item: item.into(),
            message: message.into(),
        };
        warn!("{}: skipped {}: {}", warning.migration, warning.item, warning.message);
        self.warnings.push(warning);
    }

    pub fn into_warnings(self) -> Vec<SeedWarning> {
        self.warnings
    }
}

/// Submitted with `inventory::submit!` for every built-in migration.
pub struct MigrationRegistration {
    pub migration: &'static dyn Migration,
}

inventory::collect!(MigrationRegistration);

/// Validated, ordered set of migrations.
pub struct MigrationRegistry {
    entries: Vec<RegistryEntry>,
}

struct RegistryEntry {
    order: u64,
    migration: &'static dyn Migration,
}

impl MigrationRegistry {
    /// Every migration submitted through `inventory`.
    pub fn builtin() -> Result<Self, MigrationError> {
        Self::from_migrations(inventory::iter::<MigrationRegistration>().map(|registration| registration.migration))
    }

    /// Build a registry from an explicit list.
    ///
    /// Fails on the first name that does not follow `<order>-<description>` or
    /// that appears twice.
    pub fn from_migrations(
        migrations: impl IntoIterator<Item = &'static dyn Migration>,
    ) -> Result<Self, MigrationError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for migration in migrations {
            let name = migration.name();
            let order = parse_order(name)?;
            if !seen.insert(name) {
                return Err(MigrationError::DuplicateName { name: name.to_string() });
            }
            entries.push(RegistryEntry { order, migration });
        }

        entries.sort_by(|a, b| compare_entries(a, b));
        Ok(Self { entries })
    }

    /// Migrations in execution order.
    pub fn ordered(&self) -> impl Iterator<Item = &'static dyn Migration> + '_ {
        self.entries.iter().map(|entry| entry.migration)
    }

    pub fn get(&self, name: &str) -> Option<&'static dyn Migration> {
        self.entries
            .iter()
            .find(|entry| entry.migration.name() == name)
            .map(|entry| entry.migration)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.ordered().map(|migration| migration.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compare_entries(a: &RegistryEntry, b: &RegistryEntry) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| a.migration.name().cmp(b.migration.name()))
}

/// Numeric order prefix of a migration name.
pub fn parse_order(name: &str) -> Result<u64, MigrationError> {
    MIGRATION_NAME
        .captures(name)
        .and_then(|captures| captures.get(1))
        .and_then(|order| order.as_str().parse::<u64>().ok())
        .ok_or_else(|| MigrationError::InvalidName { name: name.to_string() })
}
