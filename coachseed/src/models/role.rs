use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Model;

#[derive(Model, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[coach(collection = "roles")]
pub struct Role {
    #[coach(id)]
    pub id: String,
    #[coach(index(tag))]
    pub name: String,
    /// Natural key.
    #[coach(unique, index(numeric, sortable))]
    pub code: i32,
    pub is_active: bool,
    #[serde(default)]
    pub description: String,
    #[coach(created_at)]
    pub created_at: DateTime<Utc>,
    #[coach(updated_at)]
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>, code: i32, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: name.into(),
            code,
            is_active: true,
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
