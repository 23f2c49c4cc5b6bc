#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_REGISTRY: &str = "stratus_metrics::registry";
pub const TRACING_TARGET_MEASURE: &str = "stratus_metrics::measure";
pub const TRACING_TARGET_EXPOSITION: &str = "stratus_metrics::exposition";

pub mod exposition;
pub mod measure;
pub mod registry;

// Re-export for convenience
pub use crate::exposition::{
    FAILURES_METRIC, LATENCY_METRIC, RegistryCollector, SUCCESSES_METRIC, render,
};
pub use crate::measure::{MeasuredOperation, Measurement, Outcome};
pub use crate::registry::{LatencySummary, MetricsRegistry, MetricsSnapshot};

/// Error type for metrics recording and exposition.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// A latency sample was rejected before reaching the registry.
    ///
    /// Samples must be finite and non-negative; anything else would corrupt
    /// the aggregate distribution and is dropped at the door.
    #[error("invalid latency measurement: {value}")]
    InvalidMeasurement {
        /// The rejected sample value, in seconds.
        value: f64,
    },

    /// The registry could not accept or produce an update.
    ///
    /// This covers a poisoned sample lock and other sink-side failures. The
    /// outcome of the operation that produced the update is unaffected.
    #[error("metrics registry unavailable: {0}")]
    Unavailable(String),

    /// Encoding metrics into the exposition format failed.
    #[error("metrics exposition failed: {0}")]
    Exposition(#[from] prometheus::Error),
}

impl Error {
    /// Returns whether this error rejected a malformed sample.
    pub fn is_invalid_measurement(&self) -> bool {
        matches!(self, Error::InvalidMeasurement { .. })
    }

    /// Returns whether the registry itself was unavailable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }
}

/// Specialized [`Result`] type for metrics operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
