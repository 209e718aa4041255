use async_trait::async_trait;
use log::debug;

use super::ADMIN_ROLE_CODE;
use crate::{
    errors::MigrationError,
    migrate::{Migration, MigrationContext},
    models::{Role, User},
    password::hash_password,
    repository::Repo,
};

pub const LEGACY_ADMIN_EMAIL: &str = "admin@example.com";
const LEGACY_ADMIN_PASSWORD: &str = "Admin#2024";

/// `2-users`: the legacy test administrator.
///
/// The single item of this migration depends on the Admin role, so a missing
/// role fails the migration and leaves it pending.
pub struct LegacyAdminSeed;

#[async_trait]
impl Migration for LegacyAdminSeed {
    fn name(&self) -> &'static str {
        "2-users"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["1-roles"]
    }

    async fn up(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let admin = Repo::<Role>::new()
            .find_by(ctx.store(), "code", ADMIN_ROLE_CODE)
            .await?
            .ok_or_else(|| MigrationError::MissingReference {
                entity: "role",
                key: "Admin".to_string(),
            })?;

        let users = Repo::<User>::new();
        if users.find_by(ctx.store(), "email", LEGACY_ADMIN_EMAIL).await?.is_some() {
            debug!("{LEGACY_ADMIN_EMAIL} already present");
            return Ok(());
        }

        let password_hash = hash_password(LEGACY_ADMIN_EMAIL, LEGACY_ADMIN_PASSWORD)?;
        let user = User::new(LEGACY_ADMIN_EMAIL, "Test", "Admin", password_hash).with_role(admin.id);
        users.create(ctx.store(), user).await?;
        Ok(())
    }

    async fn down(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        Repo::<User>::new()
            .delete_by(ctx.store(), "email", LEGACY_ADMIN_EMAIL)
            .await?;
        Ok(())
    }
}
