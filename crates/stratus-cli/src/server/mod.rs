//! Metrics endpoint server.
//!
//! Binds once at startup and serves `/metrics` and `/health` for the
//! process lifetime, on its own task so scrapes never block probe
//! operations.

mod error;
mod routes;
mod shutdown;

use std::sync::Arc;

use tokio::net::TcpListener;

pub use self::error::{ServerError, ServerResult};
pub use self::routes::router;
use self::shutdown::shutdown_signal;
use crate::config::MetricsServerConfig;

// Tracing target constants
pub(crate) const TRACING_TARGET_SERVER: &str = "stratus_cli::server";

/// Binds the metrics endpoint listener.
///
/// Binding happens separately from serving so that a taken port surfaces
/// immediately at startup instead of inside a background task.
///
/// # Errors
///
/// Returns [`ServerError::PortInUse`] if the address is already bound, or
/// [`ServerError::Bind`] for any other bind failure.
pub async fn bind(config: &MetricsServerConfig) -> ServerResult<TcpListener> {
    let addr = config.server_addr();

    match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER,
                addr = %addr,
                "metrics endpoint bound"
            );

            if config.binds_to_all_interfaces() {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER,
                    "metrics endpoint is bound to all interfaces"
                );
            }

            Ok(listener)
        }
        Err(source) if source.kind() == std::io::ErrorKind::AddrInUse => {
            tracing::error!(
                target: TRACING_TARGET_SERVER,
                addr = %addr,
                "metrics endpoint port is already in use"
            );

            Err(ServerError::PortInUse {
                address: addr.to_string(),
                source,
            })
        }
        Err(source) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER,
                addr = %addr,
                error = %source,
                "failed to bind metrics endpoint"
            );

            Err(ServerError::Bind {
                address: addr.to_string(),
                source,
            })
        }
    }
}

/// Serves the metrics endpoint until a shutdown signal arrives.
///
/// # Errors
///
/// Returns [`ServerError::Runtime`] if the server fails while running.
pub async fn serve(
    listener: TcpListener,
    registry: Arc<stratus_metrics::MetricsRegistry>,
) -> ServerResult<()> {
    let app = router(registry);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_SERVER,
                error = %err,
                "metrics endpoint encountered an error"
            );
            ServerError::Runtime(err)
        })?;

    tracing::info!(target: TRACING_TARGET_SERVER, "metrics endpoint shut down gracefully");
    Ok(())
}
