//! Symmetric relationship edges between entities

use crate::storage::EntityRegistry;
use std::collections::BTreeSet;

/// An undirected edge. `Edge::new("b", "a") == Edge::new("a", "b")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    /// Lesser endpoint by name
    pub low: String,
    /// Greater endpoint by name
    pub high: String,
}

impl Edge {
    /// Create a new edge with its endpoints in canonical order
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Whether both endpoints name the same entity
    pub fn is_loop(&self) -> bool {
        self.low == self.high
    }
}

impl EntityRegistry {
    /// Relate `a` and `b` in both directions, creating either entity if needed.
    /// Returns whether the graph changed. `relate(a, a)` adds a self loop, so
    /// `a` is then among the recipients of its own notifications.
    pub fn relate(&mut self, a: &str, b: &str) -> bool {
        let inserted = self.get_or_create(a).relations.insert(b.to_string());
        self.get_or_create(b).relations.insert(a.to_string());
        inserted
    }

    /// Remove the relation between `a` and `b` in both directions, creating
    /// either entity if needed. Returns whether the graph changed.
    pub fn unrelate(&mut self, a: &str, b: &str) -> bool {
        let removed = self.get_or_create(a).relations.remove(b);
        self.get_or_create(b).relations.remove(a);
        removed
    }

    /// Whether `a` is related to `b`
    pub fn is_related(&self, a: &str, b: &str) -> bool {
        self.get(a)
            .map(|entity| entity.relations.contains(b))
            .unwrap_or(false)
    }

    /// Entities related to `name`, sorted. Empty for unknown entities.
    pub fn relations_of(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|entity| entity.relations.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every relation as a canonical edge
    pub fn edges(&self) -> BTreeSet<Edge> {
        self.names()
            .filter_map(|name| self.get(name).map(|entity| (name, entity)))
            .flat_map(|(name, entity)| {
                entity
                    .relations
                    .iter()
                    .map(move |other| Edge::new(name, other.as_str()))
            })
            .collect()
    }
}
