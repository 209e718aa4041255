use async_trait::async_trait;

use super::role_named;
use crate::{
    errors::MigrationError,
    migrate::{Migration, MigrationContext},
    models::{Profile, User},
    repository::Repo,
    validators::is_valid_http_url,
};

/// Profile details layered onto an existing user.
pub struct Enrichment {
    pub email: &'static str,
    /// Role used when the user has no profile yet.
    pub role: &'static str,
    pub headline: &'static str,
    pub bio: &'static str,
    pub phone: &'static str,
    pub timezone: &'static str,
    pub avatar_url: &'static str,
    pub specialties: &'static [&'static str],
}

pub const ENRICHMENTS: &[Enrichment] = &[
    Enrichment {
        email: "coach@example.com",
        role: "Coach",
        headline: "ICF certified leadership coach",
        bio: "Ten years helping first-time managers grow into confident leaders.",
        phone: "+1 555 0101",
        timezone: "America/New_York",
        avatar_url: "https://cdn.example.com/avatars/coach.png",
        specialties: &["leadership", "career transitions"],
    },
    Enrichment {
        email: "client@example.com",
        role: "Client",
        headline: "Product manager",
        bio: "Working on delegation and public speaking.",
        phone: "+1 555 0102",
        timezone: "Europe/London",
        avatar_url: "https://cdn.example.com/avatars/client.png",
        specialties: &[],
    },
    Enrichment {
        email: "enterprise@example.com",
        role: "Enterprise",
        headline: "Coaching programs for growing teams",
        bio: "Company-wide coaching for engineering and sales organizations.",
        phone: "+1 555 0103",
        timezone: "America/Los_Angeles",
        avatar_url: "https://cdn.example.com/avatars/enterprise.png",
        specialties: &["team coaching", "executive onboarding"],
    },
];

/// `4-profile-enrichment`: fill in headline, bio, contact details and specialties.
pub struct ProfileEnrichmentSeed;

#[async_trait]
impl Migration for ProfileEnrichmentSeed {
    fn name(&self) -> &'static str {
        "4-profile-enrichment"
    }

    fn requires(&self) -> &'static [&'static str] {
        &["3-users-profiles"]
    }

    async fn up(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let users = Repo::<User>::new();
        let profiles = Repo::<Profile>::new();

        for enrichment in ENRICHMENTS {
            let Some(user) = users.find_by(ctx.store(), "email", enrichment.email).await? else {
                ctx.warn(enrichment.email, "user not found");
                continue;
            };
            if !is_valid_http_url(enrichment.avatar_url) {
                ctx.warn(enrichment.email, format!("invalid avatar URL '{}'", enrichment.avatar_url));
                continue;
            }

            match profiles.find_by(ctx.store(), "user_id", user.id.as_str()).await? {
                Some(mut profile) => {
                    apply(&mut profile, enrichment);
                    profiles.update(ctx.store(), profile).await?;
                }
                None => {
                    let Some(role) = role_named(ctx, enrichment.role).await? else {
                        ctx.warn(enrichment.email, format!("role '{}' not found", enrichment.role));
                        continue;
                    };
                    let mut profile = Profile::new(user.id.clone(), role.id, user.full_name());
                    apply(&mut profile, enrichment);
                    profiles.create(ctx.store(), profile).await?;
                }
            }
        }
        Ok(())
    }

    async fn down(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let users = Repo::<User>::new();
        let profiles = Repo::<Profile>::new();

        for enrichment in ENRICHMENTS {
            let Some(user) = users.find_by(ctx.store(), "email", enrichment.email).await? else {
                continue;
            };
            let Some(mut profile) = profiles.find_by(ctx.store(), "user_id", user.id.as_str()).await? else {
                continue;
            };
            reset(&mut profile);
            profiles.update(ctx.store(), profile).await?;
        }
        Ok(())
    }
}

fn apply(profile: &mut Profile, enrichment: &Enrichment) {
    profile.headline = enrichment.headline.to_string();
    profile.bio = enrichment.bio.to_string();
    profile.phone = enrichment.phone.to_string();
    profile.timezone = enrichment.timezone.to_string();
    profile.avatar_url = enrichment.avatar_url.to_string();
    profile.specialties = enrichment.specialties.iter().map(|s| s.to_string()).collect();
}

fn reset(profile: &mut Profile) {
    profile.headline.clear();
    profile.bio.clear();
    profile.phone.clear();
    profile.timezone.clear();
    profile.avatar_url.clear();
    profile.specialties.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_then_reset_leaves_bare_profile() {
        let mut profile = Profile::new("u1", "r1", "Someone");
        apply(&mut profile, &ENRICHMENTS[0]);
        assert!(!profile.is_bare());
        assert_eq!(profile.specialties.len(), 2);

        reset(&mut profile);
        assert!(profile.is_bare());
        assert_eq!(profile.display_name, "Someone");
    }

    #[test]
    fn enrichment_data_is_valid() {
        for enrichment in ENRICHMENTS {
            assert!(is_valid_http_url(enrichment.avatar_url), "{}", enrichment.email);
        }
    }
}
