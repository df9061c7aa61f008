//! Graph data structures and operations
//!
//! Relationships are undirected with at most one edge per pair, self loops
//! included. Each entity keeps the set of names it is related to, and every
//! mutation writes both directions.

pub mod edge;

// Re-export main graph types
pub use edge::Edge;
