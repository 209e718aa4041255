//! Migration runner: models pass, pending migrations and single-step rollback.

use std::{collections::HashSet, time::Instant};

use log::{debug, info, warn};
use serde::Serialize;

use super::{
    Migration, MigrationContext, MigrationRegistry,
    collections::{CollectionInitializer, CollectionReport},
    history::MigrationLog,
    report::{MigrationOutcome, MigrationStatus, OutcomeKind, PlannedMigration, RollbackOutcome, RunReport, SeedWarning},
};
use crate::{errors::MigrationError, store::DocumentStore};

/// How `resolve` should mark a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Log the migration without running `up`.
    Applied,
    /// Drop the log record without running `down`.
    RolledBack,
}

/// Orders, executes and logs migrations against one store handle.
pub struct MigrationRunner<'s> {
    store: &'s mut dyn DocumentStore,
    registry: &'s MigrationRegistry,
    initializer: CollectionInitializer,
    log: MigrationLog,
    skip_collections: bool,
}

impl<'s> MigrationRunner<'s> {
    pub fn new(store: &'s mut dyn DocumentStore, registry: &'s MigrationRegistry) -> Self {
        Self {
            store,
            registry,
            initializer: CollectionInitializer::registered(),
            log: MigrationLog::new(),
            skip_collections: false,
        }
    }

    /// Replace the models pass used by [`run`](Self::run).
    pub fn with_initializer(mut self, initializer: CollectionInitializer) -> Self {
        self.initializer = initializer;
        self
    }

    /// Skip the models pass.
    pub fn skip_collections(mut self, skip: bool) -> Self {
        self.skip_collections = skip;
        self
    }

    /// Models pass, then every pending migration in order.
    ///
    /// Failures are collected in the report; a failed migration never stops the
    /// ones after it.
    pub async fn run(&mut self) -> RunReport {
        let start_time = Instant::now();
        let mut report = RunReport {
            store: self.store.describe(),
            ..RunReport::default()
        };

        if !self.skip_collections {
            report.collections = Some(self.initialize_collections().await);
        }

        let registry = self.registry;
        info!("{} migration(s) registered", registry.len());
        for migration in registry.ordered() {
            let (outcome, warnings) = self.apply(migration).await;
            report.migrations.push(outcome);
            report.warnings.extend(warnings);
        }

        report.total_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "run finished: {} applied, {} skipped, {} failed",
            report.applied(),
            report.skipped(),
            report.failed()
        );
        report
    }

    pub async fn initialize_collections(&mut self) -> CollectionReport {
        self.initializer.run(&mut *self.store).await
    }

    async fn apply(&mut self, migration: &'static dyn Migration) -> (MigrationOutcome, Vec<SeedWarning>) {
        let name = migration.name();
        let start_time = Instant::now();

        match self.log.is_applied(&mut *self.store, name).await {
            Ok(true) => {
                debug!("skipping {name}: already applied");
                return (MigrationOutcome::skipped(name), Vec::new());
            }
            Ok(false) => {}
            Err(err) => return (failed(name, start_time, err.into()), Vec::new()),
        }

        if let Err(err) = self.check_prerequisites(migration).await {
            warn!("{name} not run: {err}");
            return (failed(name, start_time, err), Vec::new());
        }

        info!("applying {name}");
        let mut ctx = MigrationContext::new(&mut *self.store, name);
        let result = migration.up(&mut ctx).await;
        let warnings = ctx.into_warnings();

        if let Err(err) = result {
            warn!("{name} failed: {err}");
            return (failed(name, start_time, err), warnings);
        }

        if let Err(err) = self.log.record(&mut *self.store, name).await {
            warn!("{name} ran but could not be logged: {err}");
            return (failed(name, start_time, err.into()), warnings);
        }

        let outcome = MigrationOutcome {
            name: name.to_string(),
            kind: OutcomeKind::Applied,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            error: None,
        };
        (outcome, warnings)
    }

    async fn check_prerequisites(&mut self, migration: &dyn Migration) -> Result<(), MigrationError> {
        for prerequisite in migration.requires() {
            if !self.log.is_applied(&mut *self.store, prerequisite).await? {
                return Err(MigrationError::MissingPrerequisite {
                    name: migration.name().to_string(),
                    prerequisite: prerequisite.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Pending migrations in execution order, without running or logging anything.
    pub async fn plan(&mut self) -> Result<Vec<PlannedMigration>, MigrationError> {
        let applied: HashSet<String> = self
            .log
            .list(&mut *self.store)
            .await?
            .into_iter()
            .map(|record| record.file_name)
            .collect();

        let registry = self.registry;
        let mut planned_names: HashSet<&str> = HashSet::new();
        let mut plan = Vec::new();
        for migration in registry.ordered() {
            if applied.contains(migration.name()) {
                continue;
            }
            let blocked_by = migration
                .requires()
                .iter()
                .filter(|prerequisite| !applied.contains(**prerequisite) && !planned_names.contains(**prerequisite))
                .map(|prerequisite| prerequisite.to_string())
                .collect();
            plan.push(PlannedMigration {
                name: migration.name().to_string(),
                requires: owned(migration.requires()),
                blocked_by,
            });
            planned_names.insert(migration.name());
        }
        Ok(plan)
    }

    /// Revert the most recently logged migration.
    ///
    /// The log record is removed only after `down` succeeds.
    pub async fn rollback_last(&mut self) -> Result<RollbackOutcome, MigrationError> {
        let Some(record) = self.log.latest(&mut *self.store).await? else {
            info!("nothing to roll back");
            return Ok(RollbackOutcome::NothingToRollback);
        };

        let registry = self.registry;
        let migration = registry
            .get(&record.file_name)
            .ok_or_else(|| MigrationError::Unregistered {
                name: record.file_name.clone(),
            })?;

        info!("rolling back {}", migration.name());
        let mut ctx = MigrationContext::new(&mut *self.store, migration.name());
        migration.down(&mut ctx).await?;
        let warnings = ctx.into_warnings();

        self.log.remove(&mut *self.store, &record.file_name).await?;
        Ok(RollbackOutcome::RolledBack {
            name: record.file_name,
            warnings,
        })
    }

    /// Every registered migration with its log state, followed by log records
    /// of migrations that are no longer registered.
    pub async fn status(&mut self) -> Result<Vec<MigrationStatus>, MigrationError> {
        let records = self.log.list(&mut *self.store).await?;
        let registry = self.registry;

        let mut statuses: Vec<MigrationStatus> = registry
            .ordered()
            .map(|migration| {
                let record = records.iter().find(|record| record.file_name == migration.name());
                MigrationStatus {
                    name: migration.name().to_string(),
                    applied: record.is_some(),
                    applied_at: record.map(|record| record.date.clone()),
                    requires: owned(migration.requires()),
                    registered: true,
                }
            })
            .collect();

        statuses.extend(
            records
                .iter()
                .filter(|record| !registry.contains(&record.file_name))
                .map(|record| MigrationStatus {
                    name: record.file_name.clone(),
                    applied: true,
                    applied_at: Some(record.date.clone()),
                    requires: Vec::new(),
                    registered: false,
                }),
        );
        Ok(statuses)
    }

    /// Mark a migration in the log without running it.
    ///
    /// Returns `false` when the log already had the requested state.
    pub async fn resolve(&mut self, name: &str, resolution: Resolution) -> Result<bool, MigrationError> {
        match resolution {
            Resolution::Applied => {
                if !self.registry.contains(name) {
                    return Err(MigrationError::Unregistered { name: name.to_string() });
                }
                if self.log.is_applied(&mut *self.store, name).await? {
                    return Ok(false);
                }
                self.log.record(&mut *self.store, name).await?;
                info!("marked {name} as applied");
                Ok(true)
            }
            Resolution::RolledBack => {
                let removed = self.log.remove(&mut *self.store, name).await?;
                if removed {
                    info!("marked {name} as rolled back");
                } else if !self.registry.contains(name) {
                    return Err(MigrationError::Unregistered { name: name.to_string() });
                }
                Ok(removed)
            }
        }
    }
}

fn failed(name: &str, start_time: Instant, err: MigrationError) -> MigrationOutcome {
    MigrationOutcome {
        name: name.to_string(),
        kind: OutcomeKind::Failed,
        elapsed_ms: start_time.elapsed().as_millis() as u64,
        error: Some(err.to_string()),
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
