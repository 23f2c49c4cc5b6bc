//! Latency probe configuration.

use anyhow::{Result as AnyhowResult, anyhow};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use stratus_store::{Region, S3Settings, StoreConfig, StoreCredentials};
use url::Url;

/// Storage provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// In-memory mock store; no external service required.
    Memory,
    /// Amazon S3 or S3-compatible storage.
    S3,
}

/// Configuration for the multi-region latency probe.
///
/// # Environment Variables
///
/// - `PROBE_OPS` - Round trips per region (default: 1)
/// - `PROBE_PROVIDER` - Storage provider, `memory` or `s3` (default: memory)
/// - `PROBE_ENDPOINT` - Custom S3-compatible endpoint URL
/// - `PROBE_ACCESS_KEY` / `PROBE_SECRET_KEY` - S3 credentials
/// - `PROBE_REGIONS` - Comma-separated region subset (default: all)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ProbeConfig {
    /// Number of put/get round trips per region.
    #[arg(long, env = "PROBE_OPS", default_value_t = 1)]
    pub ops_per_region: u32,

    /// Storage provider to probe.
    #[arg(long, env = "PROBE_PROVIDER", value_enum, default_value = "memory")]
    pub provider: ProviderKind,

    /// Custom S3-compatible endpoint URL.
    #[arg(long, env = "PROBE_ENDPOINT")]
    pub endpoint: Option<Url>,

    /// Access key for the S3 provider.
    #[arg(long, env = "PROBE_ACCESS_KEY")]
    pub access_key: Option<String>,

    /// Secret key for the S3 provider.
    #[arg(long, env = "PROBE_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Restrict the sweep to the given regions. Sweeps all regions if empty.
    #[arg(long, env = "PROBE_REGIONS", value_delimiter = ',')]
    #[serde(default)]
    pub regions: Vec<Region>,

    /// Run one deliberately failing operation after the sweep.
    ///
    /// Exercises the failure-counting path end to end; the failure shows up
    /// on the metrics endpoint as a failed operation with a latency sample.
    #[arg(long, env = "PROBE_INJECT_FAULT", default_value_t = false)]
    #[serde(default)]
    pub inject_fault: bool,
}

impl ProbeConfig {
    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if the round-trip count is zero or the S3 provider
    /// is selected without credentials.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.ops_per_region == 0 {
            return Err(anyhow!("ops-per-region must be at least 1"));
        }

        if self.provider == ProviderKind::S3
            && (self.access_key.is_none() || self.secret_key.is_none())
        {
            return Err(anyhow!(
                "the s3 provider requires --access-key and --secret-key"
            ));
        }

        Ok(())
    }

    /// Returns the regions to sweep, defaulting to all of them.
    pub fn sweep_regions(&self) -> Vec<Region> {
        if self.regions.is_empty() {
            Region::all().to_vec()
        } else {
            self.regions.clone()
        }
    }

    /// Builds the store configuration for the selected provider.
    ///
    /// # Errors
    ///
    /// Returns an error if required S3 credentials are missing.
    pub fn store_config(&self) -> AnyhowResult<StoreConfig> {
        match self.provider {
            ProviderKind::Memory => Ok(StoreConfig::memory()),
            ProviderKind::S3 => {
                let access_key = self
                    .access_key
                    .as_deref()
                    .ok_or_else(|| anyhow!("missing access key"))?;
                let secret_key = self
                    .secret_key
                    .as_deref()
                    .ok_or_else(|| anyhow!("missing secret key"))?;

                let mut settings = S3Settings {
                    endpoint: None,
                    credentials: StoreCredentials::new(access_key, secret_key),
                };
                if let Some(endpoint) = &self.endpoint {
                    settings = settings.with_endpoint(endpoint.clone());
                }

                Ok(StoreConfig::S3(settings))
            }
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ops_per_region: 1,
            provider: ProviderKind::Memory,
            endpoint: None,
            access_key: None,
            secret_key: None,
            regions: Vec::new(),
            inject_fault: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_sweeps_all_regions() {
        let config = ProbeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sweep_regions().len(), 12);
    }

    #[test]
    fn reject_zero_round_trips() {
        let config = ProbeConfig {
            ops_per_region: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn s3_provider_requires_credentials() {
        let config = ProbeConfig {
            provider: ProviderKind::S3,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ProbeConfig {
            provider: ProviderKind::S3,
            access_key: Some("access".to_string()),
            secret_key: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(matches!(config.store_config().unwrap(), StoreConfig::S3(_)));
    }

    #[test]
    fn memory_provider_needs_no_credentials() {
        let config = ProbeConfig::default();
        assert!(matches!(config.store_config().unwrap(), StoreConfig::Memory));
    }

    #[test]
    fn explicit_region_subset_is_kept() {
        let config = ProbeConfig {
            regions: vec![Region::UsEast1, Region::ApSoutheast2],
            ..Default::default()
        };
        assert_eq!(
            config.sweep_regions(),
            vec![Region::UsEast1, Region::ApSoutheast2]
        );
    }
}
