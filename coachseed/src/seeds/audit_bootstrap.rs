use async_trait::async_trait;

use crate::{
    errors::MigrationError,
    migrate::{Migration, MigrationContext},
    models::{LogEntry, LogLevel},
    repository::Repo,
};

pub const BOOTSTRAP_EVENT: &str = "seed.bootstrap";

/// `5-audit-bootstrap`: audit entry marking that seed data was loaded.
pub struct AuditBootstrapSeed;

#[async_trait]
impl Migration for AuditBootstrapSeed {
    fn name(&self) -> &'static str {
        "5-audit-bootstrap"
    }

    async fn up(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let logs = Repo::<LogEntry>::new();
        if logs.find_by(ctx.store(), "event", BOOTSTRAP_EVENT).await?.is_none() {
            let entry = LogEntry::new(BOOTSTRAP_EVENT, LogLevel::Info, "Seed data loaded");
            logs.create(ctx.store(), entry).await?;
        }
        Ok(())
    }

    async fn down(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        Repo::<LogEntry>::new()
            .delete_by(ctx.store(), "event", BOOTSTRAP_EVENT)
            .await?;
        Ok(())
    }
}
