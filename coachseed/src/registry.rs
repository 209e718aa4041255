//! Model auto-registration via the inventory crate.
//!
//! `#[derive(Model)]` submits a [`ModelRegistration`] for every model, so the
//! collection initializer can walk all known collections without a hand-kept list.

use crate::types::ModelDescriptor;

/// Metadata submitted to the inventory by the `Model` derive macro.
pub struct ModelRegistration {
    /// The name of the model type (e.g., "Role")
    pub type_name: &'static str,
    /// The collection name (e.g., "roles")
    pub collection: &'static str,
    /// Function returning the model descriptor
    pub descriptor_fn: fn() -> ModelDescriptor,
}

inventory::collect!(ModelRegistration);

/// Iterate every registered model.
pub fn registered_models() -> impl Iterator<Item = &'static ModelRegistration> {
    inventory::iter::<ModelRegistration>()
}

/// Descriptors of every registered model, sorted by collection name.
pub fn registered_descriptors() -> Vec<ModelDescriptor> {
    let mut descriptors: Vec<ModelDescriptor> = registered_models().map(|model| (model.descriptor_fn)()).collect();
    descriptors.sort_by(|a, b| a.collection.cmp(b.collection));
    descriptors.dedup_by(|a, b| a.collection == b.collection);
    descriptors
}

pub fn get_model_by_collection(collection: &str) -> Option<&'static ModelRegistration> {
    registered_models().find(|model| model.collection == collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_models_are_registered() {
        let collections: Vec<&str> = registered_descriptors().iter().map(|d| d.collection).collect();
        for expected in ["logs", "migrations", "profiles", "roles", "users"] {
            assert!(collections.contains(&expected), "missing collection {expected}");
        }
    }

    #[test]
    fn lookup_by_collection() {
        let roles = get_model_by_collection("roles").expect("roles registered");
        assert_eq!(roles.type_name, "Role");
        assert!(get_model_by_collection("unknown").is_none());
    }

    #[test]
    fn descriptors_are_sorted_and_unique() {
        let descriptors = registered_descriptors();
        for pair in descriptors.windows(2) {
            assert!(pair[0].collection < pair[1].collection);
        }
    }
}
