//! Structured results of a run, a rollback and a status query.

use serde::Serialize;

use super::collections::CollectionReport;

/// What happened to one migration during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Applied,
    /// Already logged before this run.
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    pub name: String,
    pub kind: OutcomeKind,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MigrationOutcome {
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: OutcomeKind::Skipped,
            elapsed_ms: 0,
            error: None,
        }
    }
}

/// One item a migration skipped without failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedWarning {
    pub migration: String,
    pub item: String,
    pub message: String,
}

/// Result of [`MigrationRunner::run`](super::MigrationRunner::run).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Store backend description.
    pub store: String,
    /// `None` when the models pass was skipped.
    pub collections: Option<CollectionReport>,
    /// One entry per registered migration, in execution order.
    pub migrations: Vec<MigrationOutcome>,
    pub warnings: Vec<SeedWarning>,
    pub total_time_ms: u64,
}

impl RunReport {
    fn count(&self, kind: OutcomeKind) -> usize {
        self.migrations.iter().filter(|outcome| outcome.kind == kind).count()
    }

    pub fn applied(&self) -> usize {
        self.count(OutcomeKind::Applied)
    }

    pub fn skipped(&self) -> usize {
        self.count(OutcomeKind::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(OutcomeKind::Failed)
    }

    /// Names of applied migrations, in order.
    pub fn applied_names(&self) -> Vec<&str> {
        self.migrations
            .iter()
            .filter(|outcome| outcome.kind == OutcomeKind::Applied)
            .map(|outcome| outcome.name.as_str())
            .collect()
    }

    /// `(migration, error)` for every failed migration.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.migrations
            .iter()
            .filter_map(|outcome| outcome.error.as_deref().map(|error| (outcome.name.as_str(), error)))
    }

    pub fn outcome(&self, name: &str) -> Option<&MigrationOutcome> {
        self.migrations.iter().find(|outcome| outcome.name == name)
    }

    /// True when any migration failed or the models pass reported issues.
    pub fn has_problems(&self) -> bool {
        self.failed() > 0
            || self
                .collections
                .as_ref()
                .is_some_and(|collections| !collections.issues.is_empty())
    }
}

/// Result of a single-step rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RollbackOutcome {
    /// The migration log is empty.
    NothingToRollback,
    RolledBack { name: String, warnings: Vec<SeedWarning> },
}

/// Applied/pending state of one migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub name: String,
    pub applied: bool,
    /// RFC 3339 application time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<String>,
    pub requires: Vec<String>,
    /// False for log records whose migration is no longer registered.
    pub registered: bool,
}

/// One pending migration in a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMigration {
    pub name: String,
    pub requires: Vec<String>,
    /// Prerequisites that are neither logged nor planned earlier.
    pub blocked_by: Vec<String>,
}

impl PlannedMigration {
    pub fn is_blocked(&self) -> bool {
        !self.blocked_by.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, kind: OutcomeKind, error: Option<&str>) -> MigrationOutcome {
        MigrationOutcome {
            name: name.to_string(),
            kind,
            elapsed_ms: 1,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn counts_and_errors() {
        let report = RunReport {
            migrations: vec![
                outcome("1-a", OutcomeKind::Skipped, None),
                outcome("2-b", OutcomeKind::Applied, None),
                outcome("3-c", OutcomeKind::Failed, Some("boom")),
            ],
            ..RunReport::default()
        };

        assert_eq!((report.applied(), report.skipped(), report.failed()), (1, 1, 1));
        assert_eq!(report.applied_names(), vec!["2-b"]);
        assert_eq!(report.errors().collect::<Vec<_>>(), vec![("3-c", "boom")]);
        assert!(report.has_problems());
    }

    #[test]
    fn rollback_outcome_is_tagged() {
        let json = serde_json::to_value(RollbackOutcome::NothingToRollback).unwrap();
        assert_eq!(json["outcome"], "nothing_to_rollback");

        let json = serde_json::to_value(RollbackOutcome::RolledBack {
            name: "1-roles".to_string(),
            warnings: Vec::new(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "rolled_back");
        assert_eq!(json["name"], "1-roles");
    }

    #[test]
    fn failed_outcome_serializes_error() {
        let json = serde_json::to_value(outcome("2-users", OutcomeKind::Failed, Some("missing"))).unwrap();
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["error"], "missing");

        let json = serde_json::to_value(MigrationOutcome::skipped("1-roles")).unwrap();
        assert!(json.get("error").is_none());
    }
}
