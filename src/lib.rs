//! Peerstate - last-writer-wins entity state with relationship broadcast
//!
//! Peerstate ingests a stream of commands that relate named entities and
//! update their properties with logical timestamps. Two processing modes
//! share one merge primitive:
//!
//! - **broadcast**: sequential, every accepted change is announced to the
//!   entity's related entities in input order.
//! - **merge**: the whole batch is applied by a fixed pool of workers
//!   partitioned by stride, with no notifications, and the final state is
//!   reported as a snapshot.
#![warn(missing_docs)]

// Configure global allocator for maximum performance
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

// Core foundational modules
pub mod core;

// Main functional modules
pub mod storage;
pub mod graph;
pub mod engine;
pub mod system;

// Thin I/O shell
pub mod codec;
pub mod cli;
pub mod app;

// Re-export commonly used items for convenience
pub use crate::core::{Command, Config, Error, MergeOutcome, Result, Timestamp, UpdateCommand};
pub use crate::engine::{BroadcastEngine, Notification, PartitionedExecutor};
pub use crate::storage::{Entity, EntityRegistry, PropertyRegister};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
