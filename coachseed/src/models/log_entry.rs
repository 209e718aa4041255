use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Model;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
}

/// Audit log entry. `event` is the natural key for seeded entries.
#[derive(Model, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[coach(collection = "logs")]
pub struct LogEntry {
    #[coach(id)]
    pub id: String,
    #[coach(unique, index(tag))]
    pub event: String,
    #[serde(default)]
    #[coach(index(tag))]
    pub level: LogLevel,
    pub message: String,
    #[coach(created_at)]
    pub created_at: DateTime<Utc>,
    #[coach(updated_at)]
    pub updated_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(event: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            event: event.into(),
            level,
            message: message.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
