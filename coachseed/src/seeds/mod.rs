//! Built-in seed migrations.
//!
//! Each one is submitted to the migration registry through `inventory`.
//! A reference that is missing for one item skips that item with a warning;
//! ordering between migrations is declared through `requires`.

mod audit_bootstrap;
mod profile_enrichment;
mod roles;
mod users;
mod users_profiles;

pub use audit_bootstrap::{AuditBootstrapSeed, BOOTSTRAP_EVENT};
pub use profile_enrichment::{ENRICHMENTS, Enrichment, ProfileEnrichmentSeed};
pub use roles::{ADMIN_ROLE_CODE, ROLES, RoleSeed, RolesSeed};
pub use users::{LEGACY_ADMIN_EMAIL, LegacyAdminSeed};
pub use users_profiles::{SEEDED_ACCOUNTS, SeedAccount, UsersProfilesSeed};

use crate::{
    errors::MigrationError,
    migrate::{Migration, MigrationContext, MigrationRegistration},
    models::Role,
    repository::Repo,
};

inventory::submit! { MigrationRegistration { migration: &RolesSeed } }
inventory::submit! { MigrationRegistration { migration: &LegacyAdminSeed } }
inventory::submit! { MigrationRegistration { migration: &UsersProfilesSeed } }
inventory::submit! { MigrationRegistration { migration: &ProfileEnrichmentSeed } }
inventory::submit! { MigrationRegistration { migration: &AuditBootstrapSeed } }

/// Every built-in seed, for callers that build a registry explicitly.
pub fn all() -> Vec<&'static dyn Migration> {
    vec![
        &RolesSeed,
        &LegacyAdminSeed,
        &UsersProfilesSeed,
        &ProfileEnrichmentSeed,
        &AuditBootstrapSeed,
    ]
}

async fn role_named(ctx: &mut MigrationContext<'_>, name: &str) -> Result<Option<Role>, MigrationError> {
    Ok(Repo::<Role>::new().find_by(ctx.store(), "name", name).await?)
}
