//! Entity storage layer
//!
//! This module holds the entity registry and the last-writer-wins property
//! register that every write goes through.

pub mod register;
pub mod registry;

// Re-export main storage types
pub use register::PropertyRegister;
pub use registry::{Entity, EntityRegistry};
