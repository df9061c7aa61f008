//! Metrics collection for Peerstate runs
//!
//! Counters live on a private Prometheus registry created on first use.
//! Engines stay metric-free; drivers record a run's totals once it finishes.

use crate::core::error::Result;
use once_cell::sync::{Lazy, OnceCell};
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::time::Instant;

/// Process-wide metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static INSTANCE: OnceCell<Metrics> = OnceCell::new();

/// Counters describing what runs did
pub struct Metrics {
    /// Commands applied, of any kind
    pub commands: IntCounter,
    /// Property writes accepted by a register
    pub fields_changed: IntCounter,
    /// Notifications emitted in broadcast mode
    pub notifications: IntCounter,
    /// Relate/unrelate commands that changed the graph
    pub relations_changed: IntCounter,
    /// Wall time of whole runs in seconds
    pub run_duration: Histogram,
}

impl Metrics {
    /// Create and register a fresh metrics set on `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let commands = IntCounter::new(
            "peerstate_commands_total",
            "Total number of commands applied",
        )?;
        let fields_changed = IntCounter::new(
            "peerstate_fields_changed_total",
            "Total number of property writes accepted",
        )?;
        let notifications = IntCounter::new(
            "peerstate_notifications_total",
            "Total number of notifications emitted",
        )?;
        let relations_changed = IntCounter::new(
            "peerstate_relations_changed_total",
            "Total number of relationship commands that changed the graph",
        )?;
        let run_duration = Histogram::with_opts(
            HistogramOpts::new(
                "peerstate_run_duration_seconds",
                "Duration of complete runs in seconds",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 30.0]),
        )?;

        registry.register(Box::new(commands.clone()))?;
        registry.register(Box::new(fields_changed.clone()))?;
        registry.register(Box::new(notifications.clone()))?;
        registry.register(Box::new(relations_changed.clone()))?;
        registry.register(Box::new(run_duration.clone()))?;

        Ok(Self {
            commands,
            fields_changed,
            notifications,
            relations_changed,
            run_duration,
        })
    }

    /// Get the global metrics instance
    pub fn global() -> Result<&'static Metrics> {
        INSTANCE.get_or_try_init(|| Metrics::new(&REGISTRY))
    }
}

/// Timer for measuring run duration with automatic histogram recording
pub struct Timer {
    /// Start time of the operation
    start: Instant,
    /// Histogram to record the duration when finished
    histogram: Histogram,
}

impl Timer {
    /// Start a new timer
    pub fn start(histogram: Histogram) -> Self {
        Self {
            start: Instant::now(),
            histogram,
        }
    }

    /// Record the elapsed time and consume the timer, returning it in seconds
    pub fn finish(self) -> f64 {
        let seconds = self.start.elapsed().as_secs_f64();
        self.histogram.observe(seconds);
        seconds
    }
}

/// Get the Prometheus registry holding the global metrics
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Collect all metrics as a Prometheus text exposition
pub fn render() -> Result<String> {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = registry().gather();
    Ok(encoder.encode_to_string(&metric_families)?)
}
