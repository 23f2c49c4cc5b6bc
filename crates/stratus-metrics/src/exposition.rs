//! Prometheus exposition bridge.
//!
//! Adapts a [`MetricsRegistry`] to the `prometheus` crate through a custom
//! [`Collector`], so the `/metrics` endpoint can serve the standard
//! plain-text exposition format. The collector reads a snapshot at scrape
//! time; nothing is pushed.

use std::collections::HashMap;
use std::sync::Arc;

use prometheus::core::{Collector, Desc};
use prometheus::{TextEncoder, proto};
use tracing::warn;

use crate::registry::{LatencySummary, MetricsRegistry};
use crate::{Result, TRACING_TARGET_EXPOSITION};

/// Metric family name for the success counter.
pub const SUCCESSES_METRIC: &str = "storage_operation_successes_total";
/// Metric family name for the failure counter.
pub const FAILURES_METRIC: &str = "storage_operation_failures_total";
/// Metric family name for the latency summary.
pub const LATENCY_METRIC: &str = "storage_operation_latency_seconds";

const SUCCESSES_HELP: &str = "Total successful storage operations";
const FAILURES_HELP: &str = "Total failed storage operations";
const LATENCY_HELP: &str = "Latency of storage operations";

/// Prometheus collector over a shared [`MetricsRegistry`].
#[derive(Debug)]
pub struct RegistryCollector {
    registry: Arc<MetricsRegistry>,
    descs: Vec<Desc>,
}

impl RegistryCollector {
    /// Creates a collector for the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric descriptor is rejected by the
    /// `prometheus` crate (duplicate or malformed names).
    pub fn new(registry: Arc<MetricsRegistry>) -> Result<Self> {
        let descs = vec![
            desc(SUCCESSES_METRIC, SUCCESSES_HELP)?,
            desc(FAILURES_METRIC, FAILURES_HELP)?,
            desc(LATENCY_METRIC, LATENCY_HELP)?,
        ];

        Ok(Self { registry, descs })
    }
}

impl Collector for RegistryCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<proto::MetricFamily> {
        let snapshot = match self.registry.export() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                // An unavailable registry yields an empty scrape rather than
                // a crashed exporter.
                warn!(
                    target: TRACING_TARGET_EXPOSITION,
                    error = %error,
                    "metrics registry unavailable during scrape"
                );
                return Vec::new();
            }
        };

        vec![
            counter_family(SUCCESSES_METRIC, SUCCESSES_HELP, snapshot.success_count),
            counter_family(FAILURES_METRIC, FAILURES_HELP, snapshot.failure_count),
            summary_family(LATENCY_METRIC, LATENCY_HELP, &snapshot.latency),
        ]
    }
}

/// Renders the registry's current state in the text exposition format.
///
/// # Errors
///
/// Returns an error if collector registration or encoding fails.
pub fn render(registry: &Arc<MetricsRegistry>) -> Result<String> {
    let prometheus_registry = prometheus::Registry::new();
    prometheus_registry.register(Box::new(RegistryCollector::new(Arc::clone(registry))?))?;

    let families = prometheus_registry.gather();
    let body = TextEncoder::new().encode_to_string(&families)?;

    Ok(body)
}

fn desc(name: &str, help: &str) -> Result<Desc> {
    Ok(Desc::new(
        name.to_string(),
        help.to_string(),
        Vec::new(),
        HashMap::new(),
    )?)
}

fn counter_family(name: &str, help: &str, value: u64) -> proto::MetricFamily {
    let mut counter = proto::Counter::default();
    counter.set_value(value as f64);

    let mut metric = proto::Metric::default();
    metric.set_counter(counter);

    let mut family = proto::MetricFamily::default();
    family.set_name(name.to_string());
    family.set_help(help.to_string());
    family.set_field_type(proto::MetricType::COUNTER);
    family.mut_metric().push(metric);
    family
}

fn summary_family(name: &str, help: &str, latency: &LatencySummary) -> proto::MetricFamily {
    let mut summary = proto::Summary::default();
    summary.set_sample_count(latency.count);
    summary.set_sample_sum(latency.sum_seconds);

    for (rank, value) in [
        (0.5, latency.p50_seconds),
        (0.95, latency.p95_seconds),
        (0.99, latency.p99_seconds),
    ] {
        let mut quantile = proto::Quantile::default();
        quantile.set_quantile(rank);
        quantile.set_value(value);
        summary.mut_quantile().push(quantile);
    }

    let mut metric = proto::Metric::default();
    metric.set_summary(summary);

    let mut family = proto::MetricFamily::default();
    family.set_name(name.to_string());
    family.set_help(help.to_string());
    family.set_field_type(proto::MetricType::SUMMARY);
    family.mut_metric().push(metric);
    family
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_contains_all_families() {
        let registry = Arc::new(MetricsRegistry::new());
        let body = render(&registry).unwrap();

        assert!(body.contains(SUCCESSES_METRIC));
        assert!(body.contains(FAILURES_METRIC));
        assert!(body.contains(LATENCY_METRIC));
    }

    #[test]
    fn render_reflects_counter_values() {
        let registry = Arc::new(MetricsRegistry::new());
        registry.increment_success();
        registry.increment_success();
        registry.increment_failure();

        let body = render(&registry).unwrap();

        assert!(body.contains("storage_operation_successes_total 2"));
        assert!(body.contains("storage_operation_failures_total 1"));
    }

    #[test]
    fn render_reflects_latency_summary() {
        let registry = Arc::new(MetricsRegistry::new());
        registry.record_latency(0.25).unwrap();
        registry.record_latency(0.75).unwrap();

        let body = render(&registry).unwrap();

        assert!(body.contains("storage_operation_latency_seconds_count 2"));
        assert!(body.contains("storage_operation_latency_seconds_sum 1"));
        assert!(body.contains("quantile=\"0.5\""));
        assert!(body.contains("quantile=\"0.99\""));
    }

    #[test]
    fn collector_produces_three_families() {
        let registry = Arc::new(MetricsRegistry::new());
        let collector = RegistryCollector::new(registry).unwrap();

        let families = collector.collect();
        assert_eq!(families.len(), 3);
        assert_eq!(collector.desc().len(), 3);
    }
}
