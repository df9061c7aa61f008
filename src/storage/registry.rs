//! Entity registry
//!
//! The registry owns every entity for the lifetime of a run. Entities are
//! created on first reference and never removed. Creating an entity needs
//! `&mut EntityRegistry`; concurrent workers only ever receive
//! `&EntityRegistry`, so the map cannot change shape while they run.

use crate::core::error::{Error, Result};
use crate::core::types::Command;
use crate::storage::register::PropertyRegister;
use parking_lot::{Mutex, MutexGuard};
use std::collections::{BTreeMap, BTreeSet};

/// A named unit of state: its relation set and its property register
#[derive(Debug, Default)]
pub struct Entity {
    /// Names of related entities
    pub(crate) relations: BTreeSet<String>,

    /// Property register guarded for partitioned merges
    properties: Mutex<PropertyRegister>,
}

impl Entity {
    /// Create an entity with no relations and no properties
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire this entity's register. The guard releases on drop.
    pub fn lock(&self) -> MutexGuard<'_, PropertyRegister> {
        self.properties.lock()
    }

    /// Direct access for exclusive owners, no locking needed
    pub fn properties_mut(&mut self) -> &mut PropertyRegister {
        self.properties.get_mut()
    }

    /// Related entity names in ascending order
    pub fn relations(&self) -> &BTreeSet<String> {
        &self.relations
    }

    /// Whether this entity has at least one relation
    pub fn has_relations(&self) -> bool {
        !self.relations.is_empty()
    }
}

/// Owner of every entity known to a run, keyed by name
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<String, Entity>,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entity for `name`, creating it on first reference
    pub fn get_or_create(&mut self, name: &str) -> &mut Entity {
        self.entities.entry(name.to_string()).or_insert_with(|| {
            tracing::trace!(entity = name, "registering entity");
            Entity::new()
        })
    }

    /// Look up an existing entity
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Look up an existing entity for exclusive use
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    /// Look up an entity that must already be registered
    pub fn require(&self, name: &str) -> Result<&Entity> {
        self.get(name)
            .ok_or_else(|| Error::UnknownEntity(name.to_string()))
    }

    /// Register every entity referenced by any of `commands`.
    /// Must complete before a partitioned merge starts.
    pub fn prepopulate<'a, I>(&mut self, commands: I) -> usize
    where
        I: IntoIterator<Item = &'a Command>,
    {
        for command in commands {
            for name in command.entities() {
                self.get_or_create(name);
            }
        }
        self.entities.len()
    }

    /// Whether an entity with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity has been registered
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity names in ascending order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Final state of every entity: name to field/value map, sorted.
    /// Entities without properties map to an empty object.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.entities
            .iter()
            .map(|(name, entity)| (name.clone(), entity.lock().values()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UpdateCommand;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut registry = EntityRegistry::new();
        registry.get_or_create("alice").properties_mut().apply(1, "x", "v1");
        registry.get_or_create("alice");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("alice").unwrap().lock().value("x"), Some("v1"));
    }

    #[test]
    fn test_require_unknown_entity() {
        let registry = EntityRegistry::new();
        assert!(matches!(registry.require("ghost"), Err(Error::UnknownEntity(name)) if name == "ghost"));
    }

    #[test]
    fn test_prepopulate_registers_every_reference() {
        let commands = vec![
            Command::relate("a", "b"),
            Command::from(UpdateCommand::new("c", 1, [("x", "1")])),
            Command::unrelate("d", "a"),
        ];

        let mut registry = EntityRegistry::new();
        assert_eq!(registry.prepopulate(&commands), 4);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_snapshot_includes_empty_entities() {
        let mut registry = EntityRegistry::new();
        registry.get_or_create("quiet");
        registry.get_or_create("loud").properties_mut().apply(2, "volume", "11");

        let snapshot = registry.snapshot();
        assert!(snapshot["quiet"].is_empty());
        assert_eq!(snapshot["loud"]["volume"], "11");
    }

    #[test]
    fn test_lock_is_released_on_drop() {
        let mut registry = EntityRegistry::new();
        registry.get_or_create("e");
        let entity = registry.get("e").unwrap();

        {
            let mut guard = entity.lock();
            guard.apply(1, "k", "v");
        }
        // Would deadlock if the first guard were still held
        assert_eq!(entity.lock().value("k"), Some("v"));
    }
}
