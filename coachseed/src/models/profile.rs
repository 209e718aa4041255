use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Model;

/// Public profile attached to exactly one user.
#[derive(Model, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[coach(collection = "profiles")]
pub struct Profile {
    #[coach(id)]
    pub id: String,
    #[coach(unique, index(tag))]
    pub user_id: String,
    #[coach(index(tag))]
    pub role_id: String,
    #[coach(index(text, sortable))]
    pub display_name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[coach(created_at)]
    pub created_at: DateTime<Utc>,
    #[coach(updated_at)]
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(user_id: impl Into<String>, role_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            user_id: user_id.into(),
            role_id: role_id.into(),
            display_name: display_name.into(),
            headline: String::new(),
            bio: String::new(),
            phone: String::new(),
            timezone: String::new(),
            avatar_url: String::new(),
            specialties: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True when none of the enrichment fields carry a value.
    pub fn is_bare(&self) -> bool {
        self.headline.is_empty()
            && self.bio.is_empty()
            && self.phone.is_empty()
            && self.timezone.is_empty()
            && self.avatar_url.is_empty()
            && self.specialties.is_empty()
    }
}
