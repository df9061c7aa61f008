//! Core system types and foundations
//!
//! This module contains the fundamental building blocks shared by both
//! processing modes: command and value types, error handling and
//! configuration.

pub mod types;
pub mod error;
pub mod config;

// Re-export commonly used items
pub use types::{Command, MergeOutcome, PropertyValue, Timestamp, UpdateCommand};
pub use error::{Error, Result};
pub use config::Config;
