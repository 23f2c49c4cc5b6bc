//! Multi-region latency probe.
//!
//! Sweeps the configured regions one at a time: registers a uniquely named
//! bucket, then runs timed put/get round trips against it with content
//! verification. Every attempt goes through the measured-operation wrapper,
//! so the sweep is what populates the counters and latency summary served
//! at `/metrics`. A failing region is logged and skipped; the sweep
//! continues.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use stratus_metrics::{MeasuredOperation, MetricsRegistry};
use stratus_store::{FaultInjector, ObjectStore, Region};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::TRACING_TARGET_PROBE;
use crate::config::ProbeConfig;

/// Object key used for probe round trips.
const PROBE_KEY: &str = "test-key";

/// Payload written and read back by every round trip.
const PROBE_PAYLOAD: &[u8] = b"This is a test for server latency.";

/// Per-region probe results.
#[derive(Debug, Clone)]
pub struct RegionReport {
    /// Region that was probed.
    pub region: Region,
    /// Name of the bucket created for the probe.
    pub bucket: String,
    /// Bucket creation latency; `None` if creation failed.
    pub bucket_creation: Option<Duration>,
    /// Total round-trip latency; `None` if any round trip failed.
    pub operation_latency: Option<Duration>,
}

impl RegionReport {
    /// Returns whether every operation in this region succeeded.
    pub fn succeeded(&self) -> bool {
        self.operation_latency.is_some()
    }
}

/// Results of a full sweep.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// One report per probed region, in sweep order.
    pub regions: Vec<RegionReport>,
}

impl SweepReport {
    /// Number of regions where at least one operation failed.
    pub fn failed_regions(&self) -> usize {
        self.regions.iter().filter(|r| !r.succeeded()).count()
    }
}

/// Sweeps the configured regions, reporting every attempt to the registry.
pub async fn run_sweep(
    store: &ObjectStore,
    registry: &Arc<MetricsRegistry>,
    config: &ProbeConfig,
) -> SweepReport {
    let measured = MeasuredOperation::new(Arc::clone(registry)).with_propagate_errors(true);
    let payload = Bytes::from_static(PROBE_PAYLOAD);

    let mut regions = Vec::new();

    for region in config.sweep_regions() {
        let bucket = probe_bucket_name(region);

        info!(
            target: TRACING_TARGET_PROBE,
            region = %region,
            bucket = %bucket,
            ops = config.ops_per_region,
            "probing region"
        );

        let bucket_creation = match measured.run(|| store.create_bucket(&bucket, region)).await {
            Ok(measurement) => measurement.duration,
            Err(error) => {
                error!(
                    target: TRACING_TARGET_PROBE,
                    region = %region,
                    bucket = %bucket,
                    error = %error,
                    "bucket creation failed"
                );

                regions.push(RegionReport {
                    region,
                    bucket,
                    bucket_creation: None,
                    operation_latency: None,
                });
                continue;
            }
        };

        let mut operation_latency = Some(Duration::ZERO);
        for attempt in 0..config.ops_per_region {
            match measured.run(|| round_trip(store, &bucket, &payload)).await {
                Ok(measurement) => {
                    operation_latency = operation_latency.map(|total| total + measurement.duration);
                }
                Err(error) => {
                    error!(
                        target: TRACING_TARGET_PROBE,
                        region = %region,
                        bucket = %bucket,
                        attempt = attempt + 1,
                        error = %error,
                        "round trip failed"
                    );

                    operation_latency = None;
                    break;
                }
            }
        }

        regions.push(RegionReport {
            region,
            bucket,
            bucket_creation: Some(bucket_creation),
            operation_latency,
        });
    }

    SweepReport { regions }
}

/// Runs one deliberately failing operation through the wrapper.
///
/// The injected fault is swallowed into the measurement; it shows up as a
/// failure count and a latency sample, never as a process error.
pub async fn inject_fault(registry: &Arc<MetricsRegistry>) {
    let measured = MeasuredOperation::new(Arc::clone(registry));
    let injector = FaultInjector::service_unavailable();

    if let Ok(measurement) = measured.run(|| injector.inject::<()>()).await {
        info!(
            target: TRACING_TARGET_PROBE,
            duration_ms = measurement.duration.as_millis(),
            "injected fault recorded"
        );
    }
}

/// Logs the per-region results and a sweep summary.
pub fn log_report(report: &SweepReport) {
    for region_report in &report.regions {
        match (
            region_report.bucket_creation,
            region_report.operation_latency,
        ) {
            (Some(bucket_creation), Some(operation_latency)) => {
                info!(
                    target: TRACING_TARGET_PROBE,
                    region = %region_report.region,
                    bucket = %region_report.bucket,
                    bucket_creation_ms = bucket_creation.as_millis(),
                    operation_ms = operation_latency.as_millis(),
                    "region probe complete"
                );
            }
            _ => {
                warn!(
                    target: TRACING_TARGET_PROBE,
                    region = %region_report.region,
                    bucket = %region_report.bucket,
                    "region probe failed"
                );
            }
        }
    }

    info!(
        target: TRACING_TARGET_PROBE,
        regions = report.regions.len(),
        failed = report.failed_regions(),
        "latency sweep finished"
    );
}

/// Generates a unique bucket name for a region probe.
fn probe_bucket_name(region: Region) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("latency-test-bucket-{region}-{}", &suffix[..8])
}

async fn round_trip(store: &ObjectStore, bucket: &str, payload: &Bytes) -> anyhow::Result<()> {
    store.put(bucket, PROBE_KEY, payload.clone()).await?;
    let body = store.get(bucket, PROBE_KEY).await?;
    anyhow::ensure!(body == *payload, "round trip returned mismatched content");
    Ok(())
}
