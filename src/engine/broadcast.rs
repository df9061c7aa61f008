//! Sequential processing with synchronous broadcast
//!
//! Commands are applied strictly in input order on a single thread. An
//! update that changes at least one field of an entity with relations
//! produces exactly one [`Notification`], handed to the sink before the
//! next command is applied.

use crate::core::error::Result;
use crate::core::types::{Command, UpdateCommand};
use crate::engine::notify::{maybe_notify, Notification};
use crate::storage::EntityRegistry;

/// Totals for a broadcast run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Commands applied, of any kind
    pub commands: u64,
    /// Update commands applied
    pub updates: u64,
    /// Property writes accepted
    pub fields_changed: u64,
    /// Relate/unrelate commands that changed the graph
    pub relations_changed: u64,
    /// Notifications emitted
    pub notifications: u64,
}

/// Mode A processor: registry, relationship graph and notifier in one owner
#[derive(Debug, Default)]
pub struct BroadcastEngine {
    registry: EntityRegistry,
    stats: RunStats,
}

impl BroadcastEngine {
    /// Create an engine over an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine over an existing registry
    pub fn with_registry(registry: EntityRegistry) -> Self {
        Self {
            registry,
            stats: RunStats::default(),
        }
    }

    /// Apply one command, returning the notification it produced, if any
    pub fn apply(&mut self, command: &Command) -> Option<Notification> {
        self.stats.commands += 1;
        match command {
            Command::Relate { a, b } => {
                if self.registry.relate(a, b) {
                    self.stats.relations_changed += 1;
                }
                None
            }
            Command::Unrelate { a, b } => {
                if self.registry.unrelate(a, b) {
                    self.stats.relations_changed += 1;
                }
                None
            }
            Command::Update(update) => self.apply_update(update),
        }
    }

    fn apply_update(&mut self, update: &UpdateCommand) -> Option<Notification> {
        let entity = self.registry.get_or_create(&update.entity);
        let changed = entity
            .properties_mut()
            .apply_all(update.timestamp, &update.values);

        self.stats.updates += 1;
        self.stats.fields_changed += changed.len() as u64;

        let notification = maybe_notify(&update.entity, entity, update.timestamp, changed);
        if notification.is_some() {
            self.stats.notifications += 1;
        }
        notification
    }

    /// Apply `commands` in order, handing each notification to `sink` as it
    /// is produced. A sink error stops the run.
    pub fn run<'a, I, F>(&mut self, commands: I, mut sink: F) -> Result<RunStats>
    where
        I: IntoIterator<Item = &'a Command>,
        F: FnMut(&Notification) -> Result<()>,
    {
        for command in commands {
            if let Some(notification) = self.apply(command) {
                sink(&notification)?;
            }
        }

        tracing::debug!(
            commands = self.stats.commands,
            notifications = self.stats.notifications,
            "broadcast run finished"
        );
        Ok(self.stats)
    }

    /// Totals so far
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Current registry
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Give up the engine, keeping its registry
    pub fn into_registry(self) -> EntityRegistry {
        self.registry
    }
}
