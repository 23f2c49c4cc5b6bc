//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: MetricsServerConfig  # Host, port of the /metrics endpoint
//! └── probe: ProbeConfig           # Provider, regions, round trips
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

mod probe;
mod server;

use clap::Parser;
pub use probe::{ProbeConfig, ProviderKind};
pub use server::MetricsServerConfig;

/// Command-line interface for the stratus probe.
#[derive(Debug, Parser)]
#[command(name = "stratus", version, about)]
pub struct Cli {
    /// Metrics endpoint configuration.
    #[command(flatten)]
    pub server: MetricsServerConfig,

    /// Latency probe configuration.
    #[command(flatten)]
    pub probe: ProbeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_with_defaults() {
        let cli = Cli::try_parse_from(["stratus"]).unwrap();

        assert_eq!(cli.server.port, 8000);
        assert_eq!(cli.probe.ops_per_region, 1);
        assert!(cli.server.validate().is_ok());
        assert!(cli.probe.validate().is_ok());
    }

    #[test]
    fn cli_parses_probe_overrides() {
        let cli = Cli::try_parse_from([
            "stratus",
            "--port",
            "9100",
            "--ops-per-region",
            "3",
            "--regions",
            "us-east-1,eu-west-1",
        ])
        .unwrap();

        assert_eq!(cli.server.port, 9100);
        assert_eq!(cli.probe.ops_per_region, 3);
        assert_eq!(cli.probe.regions.len(), 2);
    }
}
