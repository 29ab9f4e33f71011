//! Component class registry.
//!
//! The dependency graph needs one piece of information static template
//! scanning cannot provide: the inheritance chain of a component class. A
//! component may render a template defined by its superclass, so a change to
//! the superclass's file must invalidate caches of every subclass - even
//! though no template textually references it.
//!
//! [`ComponentRegistry`] is that knowledge, modeled as an explicit injected
//! value rather than global class-loading state: a mapping from class name
//! to [`ComponentClass`] descriptor, populated once at application start and
//! read-only for the lifetime of every graph build.

use std::collections::{HashMap, HashSet};

/// Descriptor for one loaded component class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentClass {
    /// Fully-qualified class name, e.g. `Nav::ItemComponent`.
    pub name: String,
    /// Direct superclass name, `None` at the hierarchy root.
    pub parent: Option<String>,
}

impl ComponentClass {
    /// Create a root-level class descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Create a class descriptor with a superclass.
    pub fn with_parent(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
        }
    }
}

/// Registry of currently-loaded component classes.
///
/// Registration order is preserved so graph construction visits classes
/// deterministically.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    classes: Vec<ComponentClass>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, replacing any previous descriptor with the same name.
    pub fn register(&mut self, class: ComponentClass) {
        if let Some(&slot) = self.index.get(&class.name) {
            self.classes[slot] = class;
        } else {
            self.index.insert(class.name.clone(), self.classes.len());
            self.classes.push(class);
        }
    }

    /// Look up a class by name.
    pub fn get(&self, name: &str) -> Option<&ComponentClass> {
        self.index.get(name).map(|&slot| &self.classes[slot])
    }

    /// Whether a class with this name is loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All loaded classes, in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &ComponentClass> {
        self.classes.iter()
    }

    /// Number of loaded classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Ordered supertype chain of a class, nearest superclass first.
    ///
    /// The chain stops at the first parent that is not itself registered.
    /// A malformed registry whose parent links loop terminates instead of
    /// recursing: a class already emitted is never revisited.
    pub fn ancestors(&self, name: &str) -> Vec<&ComponentClass> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(name.to_string());

        let mut current = self.get(name).and_then(|class| class.parent.as_deref());
        while let Some(parent_name) = current {
            if !seen.insert(parent_name.to_string()) {
                break;
            }
            match self.get(parent_name) {
                Some(parent) => {
                    chain.push(parent);
                    current = parent.parent.as_deref();
                }
                None => break,
            }
        }
        chain
    }

    /// Whether `ancestor` appears in `descendant`'s supertype chain.
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        self.ancestors(descendant).iter().any(|class| class.name == ancestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register(ComponentClass::new("BaseComponent"));
        registry.register(ComponentClass::with_parent("CardComponent", "BaseComponent"));
        registry.register(ComponentClass::with_parent("FancyCardComponent", "CardComponent"));
        registry
    }

    #[test]
    fn test_get_and_contains() {
        let registry = registry();
        assert!(registry.contains("CardComponent"));
        assert!(!registry.contains("GhostComponent"));
        assert_eq!(registry.get("BaseComponent").unwrap().parent, None);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = registry();
        registry.register(ComponentClass::new("CardComponent"));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("CardComponent").unwrap().parent, None);
    }

    #[test]
    fn test_ancestors_ordered() {
        let registry = registry();
        let chain: Vec<&str> =
            registry.ancestors("FancyCardComponent").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(chain, ["CardComponent", "BaseComponent"]);
    }

    #[test]
    fn test_ancestors_unregistered_parent_truncates() {
        let mut registry = registry();
        registry.register(ComponentClass::with_parent("OrphanComponent", "UnloadedComponent"));
        assert!(registry.ancestors("OrphanComponent").is_empty());
    }

    #[test]
    fn test_ancestors_cycle_terminates() {
        let mut registry = ComponentRegistry::new();
        registry.register(ComponentClass::with_parent("AComponent", "BComponent"));
        registry.register(ComponentClass::with_parent("BComponent", "AComponent"));

        let chain: Vec<&str> =
            registry.ancestors("AComponent").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(chain, ["BComponent"]);
    }

    #[test]
    fn test_is_ancestor() {
        let registry = registry();
        assert!(registry.is_ancestor("BaseComponent", "FancyCardComponent"));
        assert!(!registry.is_ancestor("FancyCardComponent", "BaseComponent"));
        assert!(!registry.is_ancestor("CardComponent", "CardComponent"));
    }
}
