use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Model;

/// Platform account. `email` is the natural key.
#[derive(Model, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[coach(collection = "users")]
pub struct User {
    #[coach(id)]
    pub id: String,
    #[coach(unique, index(tag))]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    #[serde(default)]
    pub role_ids: Vec<String>,
    pub is_active: bool,
    #[coach(created_at)]
    pub created_at: DateTime<Utc>,
    #[coach(updated_at)]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_hash: password_hash.into(),
            role_ids: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role_id: impl Into<String>) -> Self {
        self.role_ids.push(role_id.into());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
