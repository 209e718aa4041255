use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

/// Static metadata emitted by `#[derive(Model)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Rust type name (e.g. "Role")
    pub type_name: &'static str,
    /// Backing collection (e.g. "roles")
    pub collection: &'static str,
    /// JSON field holding the document id
    pub id_field: &'static str,
    /// Fields marked `#[coach(unique)]`
    pub natural_keys: &'static [&'static str],
    /// Fields marked `#[coach(index(..))]`
    pub indexes: &'static [IndexField],
}

impl ModelDescriptor {
    pub fn is_indexed(&self) -> bool {
        !self.indexes.is_empty()
    }

    pub fn is_natural_key(&self, field: &str) -> bool {
        self.natural_keys.contains(&field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexField {
    pub field: &'static str,
    pub kind: IndexKind,
    pub sortable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    #[default]
    Tag,
    Text,
    Numeric,
}

impl IndexKind {
    /// RediSearch schema keyword.
    pub fn as_schema_type(self) -> &'static str {
        match self {
            IndexKind::Tag => "TAG",
            IndexKind::Text => "TEXT",
            IndexKind::Numeric => "NUMERIC",
        }
    }
}

/// A document persisted in a collection.
///
/// Implemented by `#[derive(Model)]`; the struct must also derive `Serialize` and `Deserialize`.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection the documents live in.
    const COLLECTION: &'static str;

    fn descriptor() -> ModelDescriptor;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Refresh the timestamp fields. `created` is true on first insert.
    fn stamp(&mut self, now: DateTime<Utc>, created: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[IndexField] = &[IndexField {
        field: "code",
        kind: IndexKind::Numeric,
        sortable: true,
    }];

    #[test]
    fn descriptor_helpers() {
        let descriptor = ModelDescriptor {
            type_name: "Role",
            collection: "roles",
            id_field: "id",
            natural_keys: &["code"],
            indexes: FIELDS,
        };

        assert!(descriptor.is_indexed());
        assert!(descriptor.is_natural_key("code"));
        assert!(!descriptor.is_natural_key("name"));
    }

    #[test]
    fn index_kind_schema_types() {
        assert_eq!(IndexKind::Tag.as_schema_type(), "TAG");
        assert_eq!(IndexKind::Text.as_schema_type(), "TEXT");
        assert_eq!(IndexKind::Numeric.as_schema_type(), "NUMERIC");
        assert_eq!(IndexKind::default(), IndexKind::Tag);
    }
}
