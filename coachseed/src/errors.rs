use std::borrow::Cow;

use thiserror::Error;

/// Errors raised by a [`DocumentStore`](crate::store::DocumentStore) backend or the typed repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored document could not be decoded.
    #[error("failed to decode document '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be encoded before writing.
    #[error("failed to encode document for '{collection}': {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// A natural key value already exists on another document.
    #[error("duplicate {field} '{value}' in collection '{collection}' (existing document '{existing_id}')")]
    DuplicateKey {
        collection: String,
        field: String,
        value: String,
        existing_id: String,
    },

    /// Target document was not found when performing an update.
    #[error("document '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

/// Errors raised while building the registry, running or reverting a migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Registered name does not follow `<order>-<description>`.
    #[error("invalid migration name '{name}': expected '<order>-<description>'")]
    InvalidName { name: String },

    #[error("migration '{name}' is registered more than once")]
    DuplicateName { name: String },

    /// A declared prerequisite has no Migration Record.
    #[error("migration '{name}' requires '{prerequisite}', which has not been applied")]
    MissingPrerequisite { name: String, prerequisite: String },

    /// The migration exposes no reverse operation.
    #[error("migration '{name}' has no down operation and cannot be rolled back")]
    MissingDown { name: String },

    /// The Migration Log names a migration that is not in the registry.
    #[error("migration '{name}' is recorded in the log but not registered")]
    Unregistered { name: String },

    /// A hard reference required by the whole migration does not exist.
    #[error("required {entity} '{key}' not found")]
    MissingReference { entity: &'static str, key: String },

    #[error("failed to hash password for '{email}': {message}")]
    PasswordHash { email: String, message: String },

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl MigrationError {
    pub fn other(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The store URL references an environment variable that is not set.
    #[error("environment variable {name} is not set")]
    MissingEnv { name: String },

    #[error("store URL is empty")]
    EmptyUrl,
}
