use async_trait::async_trait;
use log::debug;

use crate::{
    errors::MigrationError,
    migrate::{Migration, MigrationContext},
    models::Role,
    repository::Repo,
};

pub struct RoleSeed {
    pub name: &'static str,
    pub code: i32,
    pub description: &'static str,
}

pub const ADMIN_ROLE_CODE: i32 = 1;

pub const ROLES: &[RoleSeed] = &[
    RoleSeed {
        name: "Admin",
        code: ADMIN_ROLE_CODE,
        description: "Platform administration",
    },
    RoleSeed {
        name: "Coach",
        code: 2,
        description: "Runs sessions and tracks client goals",
    },
    RoleSeed {
        name: "Client",
        code: 3,
        description: "Receives coaching",
    },
    RoleSeed {
        name: "Enterprise",
        code: 4,
        description: "Manages coaching for an organization",
    },
];

/// `1-roles`: the fixed role set, keyed by code.
pub struct RolesSeed;

#[async_trait]
impl Migration for RolesSeed {
    fn name(&self) -> &'static str {
        "1-roles"
    }

    async fn up(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let roles = Repo::<Role>::new();
        for seed in ROLES {
            if roles.find_by(ctx.store(), "code", seed.code).await?.is_some() {
                debug!("role {} ({}) already present", seed.name, seed.code);
                continue;
            }
            roles
                .create(ctx.store(), Role::new(seed.name, seed.code, seed.description))
                .await?;
        }
        Ok(())
    }

    async fn down(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let roles = Repo::<Role>::new();
        for seed in ROLES {
            roles.delete_by(ctx.store(), "code", seed.code).await?;
        }
        Ok(())
    }
}
