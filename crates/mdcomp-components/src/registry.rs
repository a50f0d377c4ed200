//! Name to schema lookup.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::schema::ComponentSchema;

/// Registry mapping tag names to component schemas.
///
/// Registration needs `&mut self` and happens during setup; afterwards the
/// registry is shared read-only (typically behind an `Arc`). The first
/// registration of a name wins.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: HashMap<String, ComponentSchema>,
    /// Names in registration order.
    order: Vec<String>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under a tag name.
    ///
    /// Returns `false` and leaves the existing entry untouched if the name is
    /// already registered.
    pub fn register(&mut self, name: impl Into<String>, schema: ComponentSchema) -> bool {
        match self.entries.entry(name.into()) {
            Entry::Occupied(existing) => {
                tracing::debug!(
                    name = %existing.key(),
                    kept = %existing.get().type_name(),
                    ignored = %schema.type_name(),
                    "Component name already registered"
                );
                false
            }
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(schema);
                true
            }
        }
    }

    /// Look up a schema by exact (case-sensitive) tag name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ComponentSchema> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::schema::{ParamSpec, ParamType};

    static_assertions::assert_impl_all!(ComponentRegistry: Send, Sync);

    #[test]
    fn test_empty_registry() {
        let registry = ComponentRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.lookup("Card").is_none());
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.register("Card", ComponentSchema::new("Card")));

        assert!(registry.is_registered("Card"));
        assert_eq!(registry.lookup("Card").unwrap().type_name(), "Card");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut registry = ComponentRegistry::new();
        registry.register("Card", ComponentSchema::new("Card"));

        assert!(!registry.is_registered("card"));
        assert!(!registry.is_registered("CARD"));
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = ComponentRegistry::new();
        let first = ComponentSchema::new("First")
            .with_param(ParamSpec::value("title", ParamType::String));
        assert!(registry.register("Card", first));
        assert!(!registry.register("Card", ComponentSchema::new("Second")));

        assert_eq!(registry.lookup("Card").unwrap().type_name(), "First");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_in_registration_order() {
        let mut registry = ComponentRegistry::new();
        registry.register("Zeta", ComponentSchema::new("Zeta"));
        registry.register("Alpha", ComponentSchema::new("Alpha"));
        registry.register("Zeta", ComponentSchema::new("Other"));

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_independent_registries() {
        let mut a = ComponentRegistry::new();
        let b = ComponentRegistry::new();
        a.register("Card", ComponentSchema::new("Card"));

        assert!(a.is_registered("Card"));
        assert!(!b.is_registered("Card"));
    }

    #[test]
    fn test_concurrent_lookups() {
        let mut registry = ComponentRegistry::new();
        registry.register("Card", ComponentSchema::new("Card"));
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    (0..100).all(|_| registry.lookup("Card").is_some())
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
