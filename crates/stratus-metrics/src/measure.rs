//! Measured execution of fallible operations.
//!
//! [`MeasuredOperation`] runs a caller-supplied operation exactly once, times
//! the whole attempt on a monotonic clock, and reports the latency sample and
//! outcome to a shared [`MetricsRegistry`]. Failure paths are timed too: the
//! latency of a failed attempt is a signal in its own right.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::TRACING_TARGET_MEASURE;
use crate::registry::MetricsRegistry;

/// Outcome classification of one measured operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation completed without signaling failure.
    Success,
    /// The operation returned an error.
    Failure,
}

/// Result of one invocation of [`MeasuredOperation::run`].
///
/// Consumed by the caller for inspection; the registry has already been
/// updated by the time this value exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Wall-clock duration of the attempt. Non-negative by construction.
    pub duration: Duration,
    /// Whether the operation succeeded or failed.
    pub outcome: Outcome,
}

impl Measurement {
    /// Returns whether the measured operation succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Wrapper that executes a fallible operation once and reports it.
///
/// Retry policy, timeouts, and cancellation belong to the caller supplying
/// the operation: if the operation hangs, `run` hangs with it. Wrap the
/// operation with its own deadline before passing it in if that matters.
#[derive(Debug, Clone)]
pub struct MeasuredOperation {
    registry: Arc<MetricsRegistry>,
    propagate_errors: bool,
}

impl MeasuredOperation {
    /// Creates a wrapper reporting to the given registry.
    ///
    /// Errors from the operation are swallowed into the [`Measurement`]
    /// outcome; see [`with_propagate_errors`](Self::with_propagate_errors)
    /// to re-signal them instead.
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self {
            registry,
            propagate_errors: false,
        }
    }

    /// Sets whether operation errors are re-signaled to the caller.
    ///
    /// The failure counter is incremented either way.
    pub fn with_propagate_errors(mut self, propagate_errors: bool) -> Self {
        self.propagate_errors = propagate_errors;
        self
    }

    /// Returns the registry this wrapper reports to.
    #[inline]
    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// Runs `op` exactly once, timing it and reporting the outcome.
    ///
    /// The latency sample is recorded for success and failure alike, then
    /// exactly one of the two counters is incremented. Registry failures are
    /// logged and never change the outcome classification: a metrics hiccup
    /// must not make a successful operation look failed, or vice versa.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error only when error propagation is
    /// enabled; otherwise failures surface as `Outcome::Failure`.
    pub async fn run<F, Fut, T, E>(&self, op: F) -> Result<Measurement, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let start = Instant::now();
        let result = op().await;
        let duration = start.elapsed();

        if let Err(record_error) = self.registry.record_latency(duration.as_secs_f64()) {
            warn!(
                target: TRACING_TARGET_MEASURE,
                error = %record_error,
                duration_ms = duration.as_millis(),
                "failed to record latency sample"
            );
        }

        match result {
            Ok(_) => {
                self.registry.increment_success();

                debug!(
                    target: TRACING_TARGET_MEASURE,
                    duration_ms = duration.as_millis(),
                    "operation succeeded"
                );

                Ok(Measurement {
                    duration,
                    outcome: Outcome::Success,
                })
            }
            Err(error) => {
                self.registry.increment_failure();

                debug!(
                    target: TRACING_TARGET_MEASURE,
                    error = %error,
                    duration_ms = duration.as_millis(),
                    propagate = self.propagate_errors,
                    "operation failed"
                );

                if self.propagate_errors {
                    Err(error)
                } else {
                    Ok(Measurement {
                        duration,
                        outcome: Outcome::Failure,
                    })
                }
            }
        }
    }
}
