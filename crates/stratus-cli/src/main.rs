#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod probe;
mod server;
mod telemetry;

use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stratus_metrics::MetricsRegistry;
use stratus_store::ObjectStore;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "stratus_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "stratus_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "stratus_cli::config";
pub const TRACING_TARGET_PROBE: &str = "stratus_cli::probe";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing()?;
    log_startup_info();

    cli.server
        .validate()
        .context("invalid metrics server configuration")?;
    cli.probe.validate().context("invalid probe configuration")?;
    log_config(&cli);

    let registry = Arc::new(MetricsRegistry::new());

    // Bind before anything else runs: a taken port is fatal at startup.
    let listener = server::bind(&cli.server).await?;
    let server_task = tokio::spawn(server::serve(listener, Arc::clone(&registry)));

    let store = ObjectStore::new(cli.probe.store_config()?)
        .context("failed to create object store client")?;

    let report = probe::run_sweep(&store, &registry, &cli.probe).await;
    probe::log_report(&report);

    if cli.probe.inject_fault {
        probe::inject_fault(&registry).await;
    }

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        addr = %cli.server.server_addr(),
        "probe complete; metrics remain available until shutdown"
    );

    server_task.await.context("metrics server task panicked")??;

    Ok(())
}

/// Logs the resolved configuration.
fn log_config(cli: &Cli) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        addr = %cli.server.server_addr(),
        provider = ?cli.probe.provider,
        ops_per_region = cli.probe.ops_per_region,
        regions = cli.probe.sweep_regions().len(),
        inject_fault = cli.probe.inject_fault,
        "configuration loaded"
    );
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting stratus"
    );

    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}
