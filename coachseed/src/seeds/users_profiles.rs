use async_trait::async_trait;
use log::debug;

use super::role_named;
use crate::{
    errors::MigrationError,
    migrate::{Migration, MigrationContext},
    models::{Profile, User},
    password::hash_password,
    repository::Repo,
    validators::is_valid_email,
};

/// One seeded (user, profile, role) triple.
pub struct SeedAccount {
    pub email: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub password: &'static str,
    pub role: &'static str,
    pub display_name: &'static str,
}

pub const SEEDED_ACCOUNTS: &[SeedAccount] = &[
    SeedAccount {
        email: "coach@example.com",
        first_name: "Casey",
        last_name: "Morgan",
        password: "Coach#2024",
        role: "Coach",
        display_name: "Coach Casey",
    },
    SeedAccount {
        email: "client@example.com",
        first_name: "Jordan",
        last_name: "Lee",
        password: "Client#2024",
        role: "Client",
        display_name: "Jordan Lee",
    },
    SeedAccount {
        email: "enterprise@example.com",
        first_name: "Riley",
        last_name: "Chen",
        password: "Enterprise#2024",
        role: "Enterprise",
        display_name: "Northwind Coaching",
    },
];

/// `3-users-profiles`: one user and matching profile per role.
pub struct UsersProfilesSeed;

#[async_trait]
impl Migration for UsersProfilesSeed {
    fn name(&self) -> &'static str {
        "3-users-profiles"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["1-roles"]
    }

    async fn up(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let users = Repo::<User>::new();
        let profiles = Repo::<Profile>::new();

        for account in SEEDED_ACCOUNTS {
            if users.find_by(ctx.store(), "email", account.email).await?.is_some() {
                debug!("{} already present", account.email);
                continue;
            }
            if !is_valid_email(account.email) {
                ctx.warn(account.email, "invalid email address");
                continue;
            }
            let Some(role) = role_named(ctx, account.role).await? else {
                ctx.warn(account.email, format!("role '{}' not found", account.role));
                continue;
            };

            let password_hash = hash_password(account.email, account.password)?;
            let user = User::new(account.email, account.first_name, account.last_name, password_hash)
                .with_role(role.id.clone());
            let user = users.create(ctx.store(), user).await?;
            profiles
                .create(ctx.store(), Profile::new(user.id, role.id, account.display_name))
                .await?;
        }
        Ok(())
    }

    async fn down(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let users = Repo::<User>::new();
        let profiles = Repo::<Profile>::new();

        for account in SEEDED_ACCOUNTS {
            let Some(user) = users.find_by(ctx.store(), "email", account.email).await? else {
                continue;
            };
            profiles.delete_by(ctx.store(), "user_id", user.id.as_str()).await?;
            users.delete(ctx.store(), &user.id).await?;
        }
        Ok(())
    }
}
