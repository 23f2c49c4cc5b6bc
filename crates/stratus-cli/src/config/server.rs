//! Metrics endpoint configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};

/// Configuration for the `/metrics` HTTP endpoint.
///
/// # Environment Variables
///
/// - `METRICS_HOST` - Host address to bind to (default: 127.0.0.1)
/// - `METRICS_PORT` - Port to listen on (default: 8000)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct MetricsServerConfig {
    /// Host address to bind the metrics endpoint to.
    ///
    /// Use "127.0.0.1" for localhost only, "0.0.0.0" for all interfaces.
    #[arg(long, env = "METRICS_HOST", default_value = "127.0.0.1")]
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// TCP port for the metrics endpoint.
    ///
    /// Must be in the range 1024-65535; ports below 1024 require root
    /// privileges.
    #[arg(short = 'p', long, env = "METRICS_PORT", default_value_t = 8000)]
    pub port: u16,
}

/// Default host address for development.
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

impl MetricsServerConfig {
    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if the port is in the privileged range.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.port < 1024 {
            return Err(anyhow!(
                "port {} is below 1024; use ports 1024-65535 to avoid requiring root privileges",
                self.port
            ));
        }

        Ok(())
    }

    /// Returns the complete socket address for binding.
    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns whether the endpoint binds to all interfaces.
    #[must_use]
    pub const fn binds_to_all_interfaces(&self) -> bool {
        match self.host {
            IpAddr::V4(addr) => addr.is_unspecified(),
            IpAddr::V6(addr) => addr.is_unspecified(),
        }
    }
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 8000,
        }
    }
}
