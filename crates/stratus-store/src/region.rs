//! Storage regions exercised by the latency probe.

use serde::{Deserialize, Serialize};
use strum::VariantArray;

/// A storage service region.
///
/// The set matches the regions the latency probe sweeps; the in-memory
/// provider treats each as an independent namespace.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantArray,
)]
pub enum Region {
    /// US East (N. Virginia)
    #[default]
    #[strum(serialize = "us-east-1")]
    #[serde(rename = "us-east-1")]
    UsEast1,
    /// US West (N. California)
    #[strum(serialize = "us-west-1")]
    #[serde(rename = "us-west-1")]
    UsWest1,
    /// US West (Oregon)
    #[strum(serialize = "us-west-2")]
    #[serde(rename = "us-west-2")]
    UsWest2,
    /// Europe (Ireland)
    #[strum(serialize = "eu-west-1")]
    #[serde(rename = "eu-west-1")]
    EuWest1,
    /// Europe (Frankfurt)
    #[strum(serialize = "eu-central-1")]
    #[serde(rename = "eu-central-1")]
    EuCentral1,
    /// Asia Pacific (Mumbai)
    #[strum(serialize = "ap-south-1")]
    #[serde(rename = "ap-south-1")]
    ApSouth1,
    /// Asia Pacific (Tokyo)
    #[strum(serialize = "ap-northeast-1")]
    #[serde(rename = "ap-northeast-1")]
    ApNortheast1,
    /// Asia Pacific (Seoul)
    #[strum(serialize = "ap-northeast-2")]
    #[serde(rename = "ap-northeast-2")]
    ApNortheast2,
    /// Asia Pacific (Singapore)
    #[strum(serialize = "ap-southeast-1")]
    #[serde(rename = "ap-southeast-1")]
    ApSoutheast1,
    /// Asia Pacific (Sydney)
    #[strum(serialize = "ap-southeast-2")]
    #[serde(rename = "ap-southeast-2")]
    ApSoutheast2,
    /// South America (Sao Paulo)
    #[strum(serialize = "sa-east-1")]
    #[serde(rename = "sa-east-1")]
    SaEast1,
    /// Canada (Central)
    #[strum(serialize = "ca-central-1")]
    #[serde(rename = "ca-central-1")]
    CaCentral1,
}

impl Region {
    /// Returns every known region, in sweep order.
    pub fn all() -> &'static [Region] {
        Region::VARIANTS
    }
}
