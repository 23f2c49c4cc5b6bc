//! Shared registry of operation counters and latency samples.
//!
//! The registry is the only shared mutable state in the metrics core.
//! Counters are lock-free atomics; latency samples live behind a mutex whose
//! critical sections are bounded to a push or a clone.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result, TRACING_TARGET_REGISTRY};

/// Accumulator for operation outcomes and latencies.
///
/// Constructed explicitly and shared via `Arc`; each test can own an isolated
/// instance instead of mutating process-global state.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Latency samples in seconds, append-only between resets.
    latencies: Mutex<Vec<f64>>,
    /// Total successful operations.
    success_count: AtomicU64,
    /// Total failed operations.
    failure_count: AtomicU64,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a latency sample, in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMeasurement`] for negative or non-finite
    /// samples; prior state is left untouched. Returns [`Error::Unavailable`]
    /// if the sample lock is poisoned.
    pub fn record_latency(&self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::InvalidMeasurement { value: seconds });
        }

        let mut samples = self
            .latencies
            .lock()
            .map_err(|_| Error::Unavailable("latency sample lock poisoned".to_string()))?;
        samples.push(seconds);

        Ok(())
    }

    /// Increments the success counter by one.
    ///
    /// Safe under concurrent invocation; increments are never lost.
    pub fn increment_success(&self) {
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the failure counter by one.
    ///
    /// Safe under concurrent invocation; increments are never lost.
    pub fn increment_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a snapshot of current counters and the latency summary.
    ///
    /// The sample lock is held only long enough to clone the samples, so
    /// writers are never blocked for the duration of the summary math.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] if the sample lock is poisoned.
    pub fn export(&self) -> Result<MetricsSnapshot> {
        let samples = {
            let guard = self
                .latencies
                .lock()
                .map_err(|_| Error::Unavailable("latency sample lock poisoned".to_string()))?;
            guard.clone()
        };

        Ok(MetricsSnapshot {
            success_count: self.success_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            latency: LatencySummary::from_samples(&samples),
        })
    }

    /// Clears all samples and zeroes both counters.
    ///
    /// This is a maintenance operation for test isolation. Callers must
    /// ensure no measured operations are in flight; a concurrent increment
    /// may land before or after the reset, and the all-zero state is only
    /// guaranteed to be observable under quiescence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] if the sample lock is poisoned.
    pub fn reset(&self) -> Result<()> {
        let mut samples = self
            .latencies
            .lock()
            .map_err(|_| Error::Unavailable("latency sample lock poisoned".to_string()))?;
        samples.clear();

        self.success_count.store(0, Ordering::Relaxed);
        self.failure_count.store(0, Ordering::Relaxed);

        debug!(target: TRACING_TARGET_REGISTRY, "metrics registry reset");
        Ok(())
    }
}

/// Point-in-time view of the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Successful operations at snapshot time.
    pub success_count: u64,
    /// Failed operations at snapshot time.
    pub failure_count: u64,
    /// Summary of the latency samples at snapshot time.
    pub latency: LatencySummary,
}

impl MetricsSnapshot {
    /// Total operations observed, successful or not.
    pub fn total_operations(&self) -> u64 {
        self.success_count + self.failure_count
    }
}

/// Aggregate statistics over the recorded latency samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Number of samples.
    pub count: u64,
    /// Sum of all samples, in seconds.
    pub sum_seconds: f64,
    /// Arithmetic mean, in seconds. Zero when no samples were recorded.
    pub mean_seconds: f64,
    /// Smallest sample, in seconds.
    pub min_seconds: f64,
    /// Largest sample, in seconds.
    pub max_seconds: f64,
    /// Median (nearest-rank), in seconds.
    pub p50_seconds: f64,
    /// 95th percentile (nearest-rank), in seconds.
    pub p95_seconds: f64,
    /// 99th percentile (nearest-rank), in seconds.
    pub p99_seconds: f64,
}

impl LatencySummary {
    /// Computes a summary from raw samples.
    ///
    /// Samples are validated on entry to the registry, so this assumes
    /// finite, non-negative values.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len() as u64;
        let sum_seconds: f64 = sorted.iter().sum();

        Self {
            count,
            sum_seconds,
            mean_seconds: sum_seconds / count as f64,
            min_seconds: sorted[0],
            max_seconds: sorted[sorted.len() - 1],
            p50_seconds: nearest_rank(&sorted, 0.50),
            p95_seconds: nearest_rank(&sorted, 0.95),
            p99_seconds: nearest_rank(&sorted, 0.99),
        }
    }

    /// Returns whether any samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Nearest-rank quantile over ascending-sorted samples.
fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let registry = MetricsRegistry::new();
        let snapshot = registry.export().unwrap();

        assert_eq!(snapshot.success_count, 0);
        assert_eq!(snapshot.failure_count, 0);
        assert!(snapshot.latency.is_empty());
    }

    #[test]
    fn increments_accumulate() {
        let registry = MetricsRegistry::new();

        registry.increment_success();
        registry.increment_success();
        registry.increment_failure();

        let snapshot = registry.export().unwrap();
        assert_eq!(snapshot.success_count, 2);
        assert_eq!(snapshot.failure_count, 1);
        assert_eq!(snapshot.total_operations(), 3);
    }

    #[test]
    fn record_latency_accepts_valid_samples() {
        let registry = MetricsRegistry::new();

        registry.record_latency(0.0).unwrap();
        registry.record_latency(0.125).unwrap();
        registry.record_latency(2.5).unwrap();

        let snapshot = registry.export().unwrap();
        assert_eq!(snapshot.latency.count, 3);
        assert_eq!(snapshot.latency.sum_seconds, 2.625);
        assert_eq!(snapshot.latency.min_seconds, 0.0);
        assert_eq!(snapshot.latency.max_seconds, 2.5);
    }

    #[test]
    fn record_latency_rejects_negative_without_corrupting_state() {
        let registry = MetricsRegistry::new();
        registry.record_latency(0.5).unwrap();

        let result = registry.record_latency(-1.0);
        assert!(matches!(result, Err(Error::InvalidMeasurement { value }) if value == -1.0));

        let snapshot = registry.export().unwrap();
        assert_eq!(snapshot.latency.count, 1);
        assert_eq!(snapshot.latency.sum_seconds, 0.5);
    }

    #[test]
    fn record_latency_rejects_non_finite() {
        let registry = MetricsRegistry::new();

        assert!(registry.record_latency(f64::NAN).unwrap_err().is_invalid_measurement());
        assert!(registry.record_latency(f64::INFINITY).unwrap_err().is_invalid_measurement());
        assert!(
            registry
                .record_latency(f64::NEG_INFINITY)
                .unwrap_err()
                .is_invalid_measurement()
        );

        assert!(registry.export().unwrap().latency.is_empty());
    }

    #[test]
    fn export_is_idempotent_without_writes() {
        let registry = MetricsRegistry::new();
        registry.increment_success();
        registry.record_latency(0.1).unwrap();

        let first = registry.export().unwrap();
        let second = registry.export().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn counters_are_monotonic_between_exports() {
        let registry = MetricsRegistry::new();

        let before = registry.export().unwrap();
        registry.increment_success();
        registry.increment_failure();
        let after = registry.export().unwrap();

        assert!(after.success_count >= before.success_count);
        assert!(after.failure_count >= before.failure_count);
    }

    #[test]
    fn reset_clears_counters_and_samples() {
        let registry = MetricsRegistry::new();
        registry.increment_success();
        registry.increment_failure();
        registry.record_latency(1.0).unwrap();

        registry.reset().unwrap();

        let snapshot = registry.export().unwrap();
        assert_eq!(snapshot.success_count, 0);
        assert_eq!(snapshot.failure_count, 0);
        assert!(snapshot.latency.is_empty());
    }

    #[test]
    fn concurrent_increments_lose_no_updates() {
        use std::sync::Arc;

        let registry = Arc::new(MetricsRegistry::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        registry.increment_success();
                    }
                })
            })
            .collect();

        for handle in threads {
            handle.join().unwrap();
        }

        assert_eq!(registry.export().unwrap().success_count, 8000);
    }

    #[test]
    fn summary_quantiles_use_nearest_rank() {
        let samples: Vec<f64> = (1..=100).map(|n| n as f64 / 1000.0).collect();
        let summary = LatencySummary::from_samples(&samples);

        assert_eq!(summary.count, 100);
        assert_eq!(summary.p50_seconds, 0.050);
        assert_eq!(summary.p95_seconds, 0.095);
        assert_eq!(summary.p99_seconds, 0.099);
        assert_eq!(summary.min_seconds, 0.001);
        assert_eq!(summary.max_seconds, 0.100);
    }

    #[test]
    fn summary_of_single_sample_is_that_sample() {
        let summary = LatencySummary::from_samples(&[0.42]);

        assert_eq!(summary.count, 1);
        assert_eq!(summary.p50_seconds, 0.42);
        assert_eq!(summary.p95_seconds, 0.42);
        assert_eq!(summary.p99_seconds, 0.42);
        assert_eq!(summary.mean_seconds, 0.42);
    }
}
