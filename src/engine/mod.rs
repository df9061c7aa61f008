//! Command processing engines
//!
//! Both modes share the registry and the last-writer-wins register:
//! - [`BroadcastEngine`] applies commands sequentially and emits notifications
//! - [`PartitionedExecutor`] merges a preloaded batch across a worker pool

pub mod broadcast;
pub mod notify;
pub mod partitioned;


pub use broadcast::{BroadcastEngine, RunStats};
pub use notify::{maybe_notify, Notification};
pub use partitioned::{ExecutionReport, PartitionedExecutor, WorkerReport};
