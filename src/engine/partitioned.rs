//! Stride-partitioned parallel merge
//!
//! A batch of updates indexed `0..N` is split across a fixed pool of `W`
//! workers: worker `k` applies indices `k, k + W, k + 2W, ...`. There is no
//! shared queue. Workers share the registry immutably and serialise on
//! the target entity's lock for the duration of each update, so two
//! workers only contend when they touch the same entity.
//!
//! Updates for one entity can land on several workers, so their arrival
//! order is unspecified. Last-writer-wins by timestamp makes the final
//! state independent of that order, except for equal timestamps on the
//! same field, where whichever write lands first is kept.

use crate::core::error::{Error, Result};
use crate::core::types::{Command, UpdateCommand};
use crate::storage::EntityRegistry;
use std::borrow::Borrow;
use std::thread;

/// What one worker did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker index
    pub worker: usize,
    /// Updates applied
    pub applied: usize,
    /// Property writes accepted
    pub fields_changed: usize,
}

/// Outcome of a partitioned merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Per-worker results, by worker index
    pub workers: Vec<WorkerReport>,
    /// Relationship commands dropped from the batch
    pub skipped_relationship_commands: usize,
}

impl ExecutionReport {
    /// Updates applied across all workers
    pub fn applied(&self) -> usize {
        self.workers.iter().map(|w| w.applied).sum()
    }

    /// Commands consumed from the batch, dropped relationship commands included
    pub fn commands(&self) -> usize {
        self.applied() + self.skipped_relationship_commands
    }

    /// Property writes accepted across all workers
    pub fn fields_changed(&self) -> usize {
        self.workers.iter().map(|w| w.fields_changed).sum()
    }
}

/// Mode B executor: fixed worker pool, static stride partition, no notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionedExecutor {
    worker_count: usize,
}

impl PartitionedExecutor {
    /// Create an executor with `worker_count` workers
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(Error::config("Merge worker count must be at least 1"));
        }
        Ok(Self { worker_count })
    }

    /// Number of workers started per batch
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Indices below `len` owned by `worker`
    pub fn stride(&self, worker: usize, len: usize) -> impl Iterator<Item = usize> {
        (worker..len).step_by(self.worker_count)
    }

    /// Load a whole batch: register every referenced entity, then merge
    /// the updates in parallel. Relationship commands are dropped.
    pub fn merge(&self, commands: &[Command]) -> Result<(EntityRegistry, ExecutionReport)> {
        let mut registry = EntityRegistry::new();
        let entities = registry.prepopulate(commands);

        let updates: Vec<&UpdateCommand> = commands
            .iter()
            .filter_map(|command| match command {
                Command::Update(update) => Some(update),
                _ => None,
            })
            .collect();

        let skipped = commands.len() - updates.len();
        if skipped > 0 {
            tracing::warn!(skipped, "relationship commands have no effect in merge mode");
        }
        tracing::debug!(entities, updates = updates.len(), "registry prepopulated");

        let mut report = self.execute(&registry, &updates)?;
        report.skipped_relationship_commands = skipped;
        Ok((registry, report))
    }

    /// Apply `updates` across the worker pool. Every target entity must
    /// already be registered. Returns once every worker has joined.
    pub fn execute<U>(&self, registry: &EntityRegistry, updates: &[U]) -> Result<ExecutionReport>
    where
        U: Borrow<UpdateCommand> + Sync,
    {
        let results: Vec<Result<WorkerReport>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.worker_count)
                .map(|worker| {
                    thread::Builder::new()
                        .name(format!("merge-worker-{}", worker))
                        .spawn_scoped(scope, move || self.run_worker(worker, registry, updates))
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| match handle {
                    Ok(handle) => handle.join().unwrap_or_else(|_| {
                        Err(Error::Worker {
                            worker,
                            reason: "worker panicked".to_string(),
                        })
                    }),
                    Err(e) => Err(Error::Worker {
                        worker,
                        reason: format!("failed to spawn: {}", e),
                    }),
                })
                .collect()
        });

        let workers = results.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(ExecutionReport {
            workers,
            skipped_relationship_commands: 0,
        })
    }

    fn run_worker<U>(&self, worker: usize, registry: &EntityRegistry, updates: &[U]) -> Result<WorkerReport>
    where
        U: Borrow<UpdateCommand>,
    {
        let mut report = WorkerReport {
            worker,
            ..WorkerReport::default()
        };

        for index in self.stride(worker, updates.len()) {
            let update = updates[index].borrow();
            let entity = registry.require(&update.entity)?;

            let mut register = entity.lock();
            let changed = update
                .values
                .iter()
                .filter(|(field, value)| register.apply(update.timestamp, field, value).is_changed())
                .count();
            drop(register);

            report.applied += 1;
            report.fields_changed += changed;
        }

        tracing::debug!(worker, applied = report.applied, "merge worker finished");
        Ok(report)
    }
}
