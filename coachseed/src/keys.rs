/// Redis key layout for one store namespace.
#[derive(Debug, Clone)]
pub struct KeyContext {
    prefix: String,
}

impl KeyContext {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `{prefix}:{collection}:{id}`
    pub fn document(&self, collection: &str, id: &str) -> String {
        format!("{}:{}:{}", self.prefix, collection, id)
    }

    /// Key prefix shared by every document of a collection (also the index PREFIX).
    pub fn collection_prefix(&self, collection: &str) -> String {
        format!("{}:{}:", self.prefix, collection)
    }

    pub fn collection_pattern(&self, collection: &str) -> String {
        format!("{}:{}:*", self.prefix, collection)
    }

    /// Set of created collection names.
    pub fn catalog(&self) -> String {
        format!("{}:_catalog:collections", self.prefix)
    }

    pub fn index(&self, collection: &str) -> String {
        format!("{}:idx:{}", self.prefix, collection)
    }
}
