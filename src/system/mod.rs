//! System utilities and monitoring
//!
//! Logging setup and run metrics.

pub mod logging;
pub mod metrics;
