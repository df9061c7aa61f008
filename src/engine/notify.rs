//! Change notifications for related entities

use crate::core::types::Timestamp;
use crate::storage::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One accepted update, addressed to every entity related to its source.
///
/// Serialises as `{"broadcast":[..],"user":..,"timestamp":..,"values":{..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Related entities at the time of the update, ascending
    #[serde(rename = "broadcast")]
    pub recipients: Vec<String>,
    /// Entity whose properties changed
    #[serde(rename = "user")]
    pub source: String,
    /// Timestamp of the update
    pub timestamp: Timestamp,
    /// Only the fields whose write was accepted
    #[serde(rename = "values")]
    pub changed: BTreeMap<String, String>,
}

/// Build a notification if anything changed and `entity` has someone to tell.
pub fn maybe_notify(
    name: &str,
    entity: &Entity,
    timestamp: Timestamp,
    changed: BTreeMap<String, String>,
) -> Option<Notification> {
    if changed.is_empty() || !entity.has_relations() {
        return None;
    }

    Some(Notification {
        recipients: entity.relations().iter().cloned().collect(),
        source: name.to_string(),
        timestamp,
        changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EntityRegistry;

    fn changed(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_relations_no_notification() {
        let mut registry = EntityRegistry::new();
        let entity = registry.get_or_create("a");
        assert!(maybe_notify("a", entity, 1, changed(&[("x", "v1")])).is_none());
    }

    #[test]
    fn test_no_changes_no_notification() {
        let mut registry = EntityRegistry::new();
        registry.relate("a", "b");
        let entity = registry.get("a").unwrap();
        assert!(maybe_notify("a", entity, 1, BTreeMap::new()).is_none());
    }

    #[test]
    fn test_wire_shape() {
        let mut registry = EntityRegistry::new();
        registry.relate("A", "C");
        registry.relate("A", "B");
        let entity = registry.get("A").unwrap();

        let notification = maybe_notify("A", entity, 1, changed(&[("x", "v1")])).unwrap();
        assert_eq!(
            serde_json::to_string(&notification).unwrap(),
            r#"{"broadcast":["B","C"],"user":"A","timestamp":1,"values":{"x":"v1"}}"#
        );
    }
}
