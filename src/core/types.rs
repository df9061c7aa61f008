//! Core type definitions for entity state
//!
//! Entities are identified by their plain string name. Property updates
//! carry a logical timestamp used for last-writer-wins resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logical timestamp attached to every property update
pub type Timestamp = i64;

/// A stored property value together with the timestamp of the write
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// Current value
    pub value: String,
    /// Timestamp of the accepted write that set `value`
    pub last_updated: Timestamp,
}

impl PropertyValue {
    /// Create a new property value
    pub fn new(value: impl Into<String>, last_updated: Timestamp) -> Self {
        Self {
            value: value.into(),
            last_updated,
        }
    }
}

/// Result of offering a single write to a property register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The write was strictly newer and has been stored
    Changed,
    /// The write was older than or as old as the stored value and was dropped
    Unchanged,
}

impl MergeOutcome {
    /// Whether the write was accepted
    pub fn is_changed(self) -> bool {
        matches!(self, MergeOutcome::Changed)
    }
}

/// Property update targeting a single entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCommand {
    /// Target entity
    pub entity: String,
    /// Logical timestamp shared by every field in `values`
    pub timestamp: Timestamp,
    /// Field name to new value, applied in ascending field order
    pub values: BTreeMap<String, String>,
}

impl UpdateCommand {
    /// Create an update from any iterator of field/value pairs
    pub fn new<I, K, V>(entity: impl Into<String>, timestamp: Timestamp, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entity: entity.into(),
            timestamp,
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A decoded input command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Declare a symmetric relationship between two entities
    Relate {
        /// First entity
        a: String,
        /// Second entity
        b: String,
    },
    /// Remove the relationship between two entities
    Unrelate {
        /// First entity
        a: String,
        /// Second entity
        b: String,
    },
    /// Update properties on one entity
    Update(UpdateCommand),
}

impl Command {
    /// Shorthand for [`Command::Relate`]
    pub fn relate(a: impl Into<String>, b: impl Into<String>) -> Self {
        Command::Relate { a: a.into(), b: b.into() }
    }

    /// Shorthand for [`Command::Unrelate`]
    pub fn unrelate(a: impl Into<String>, b: impl Into<String>) -> Self {
        Command::Unrelate { a: a.into(), b: b.into() }
    }

    /// Every entity name this command references
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        let (first, second) = match self {
            Command::Relate { a, b } | Command::Unrelate { a, b } => (a.as_str(), Some(b.as_str())),
            Command::Update(update) => (update.entity.as_str(), None),
        };
        std::iter::once(first).chain(second)
    }
}

impl From<UpdateCommand> for Command {
    fn from(update: UpdateCommand) -> Self {
        Command::Update(update)
    }
}
