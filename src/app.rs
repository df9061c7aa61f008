//! End-to-end drivers for the two binaries
//!
//! Each driver decodes the whole input before applying anything, so a
//! malformed line fails the run without producing output.

use crate::codec;
use crate::core::error::Result;
use crate::engine::{BroadcastEngine, ExecutionReport, PartitionedExecutor, RunStats};
use crate::system::metrics::{self, Metrics, Timer};
use std::io::{BufRead, Write};

/// Mode A: apply commands in order and write one JSON line per notification
pub fn run_broadcast<R, W>(input: R, output: &mut W) -> Result<RunStats>
where
    R: BufRead,
    W: Write,
{
    let counters = Metrics::global()?;
    let timer = Timer::start(counters.run_duration.clone());

    let commands = codec::decode_all(input)?;
    tracing::info!(commands = commands.len(), "input decoded");

    let mut engine = BroadcastEngine::new();
    let stats = engine.run(&commands, |notification| {
        codec::write_notification(&mut *output, notification)
    })?;
    output.flush()?;

    counters.commands.inc_by(stats.commands);
    counters.fields_changed.inc_by(stats.fields_changed);
    counters.relations_changed.inc_by(stats.relations_changed);
    counters.notifications.inc_by(stats.notifications);

    let elapsed = timer.finish();
    tracing::info!(
        entities = engine.registry().len(),
        updates = stats.updates,
        notifications = stats.notifications,
        elapsed_secs = elapsed,
        "broadcast run complete"
    );
    tracing::trace!(metrics = %metrics::render()?, "run metrics");

    Ok(stats)
}

/// Mode B: load the batch, merge it across `worker_count` workers and
/// write the final snapshot
pub fn run_merge<R, W>(input: R, output: &mut W, worker_count: usize) -> Result<ExecutionReport>
where
    R: BufRead,
    W: Write,
{
    let counters = Metrics::global()?;
    let timer = Timer::start(counters.run_duration.clone());

    let executor = PartitionedExecutor::new(worker_count)?;
    let commands = codec::decode_all(input)?;
    tracing::info!(commands = commands.len(), workers = worker_count, "input decoded");

    let (registry, report) = executor.merge(&commands)?;
    codec::write_snapshot(output, &registry.snapshot())?;
    output.flush()?;

    counters.commands.inc_by(report.commands() as u64);
    counters.fields_changed.inc_by(report.fields_changed() as u64);

    let elapsed = timer.finish();
    tracing::info!(
        entities = registry.len(),
        updates = report.applied(),
        fields_changed = report.fields_changed(),
        elapsed_secs = elapsed,
        "merge run complete"
    );
    tracing::trace!(metrics = %metrics::render()?, "run metrics");

    Ok(report)
}
