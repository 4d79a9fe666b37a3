//! PHY link parameters passed through to switch drivers.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Link speed in Mbps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LinkSpeed(u32);

impl LinkSpeed {
    pub const MBPS_10: Self = LinkSpeed(10);
    pub const MBPS_100: Self = LinkSpeed(100);
    pub const MBPS_200: Self = LinkSpeed(200);
    pub const GBPS_1: Self = LinkSpeed(1_000);
    pub const GBPS_2_5: Self = LinkSpeed(2_500);
    pub const GBPS_10: Self = LinkSpeed(10_000);

    const SUPPORTED: [LinkSpeed; 6] = [
        Self::MBPS_10,
        Self::MBPS_100,
        Self::MBPS_200,
        Self::GBPS_1,
        Self::GBPS_2_5,
        Self::GBPS_10,
    ];

    /// Creates a link speed, accepting only the speeds switch MACs negotiate.
    pub fn from_mbps(mbps: u32) -> Result<Self, ParseError> {
        Self::SUPPORTED
            .into_iter()
            .find(|s| s.0 == mbps)
            .ok_or_else(|| ParseError::InvalidLinkSpeed(mbps.to_string()))
    }

    /// Returns the speed in Mbps.
    pub const fn as_mbps(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LinkSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}M", self.0)
    }
}

impl TryFrom<u32> for LinkSpeed {
    type Error = ParseError;

    fn try_from(mbps: u32) -> Result<Self, Self::Error> {
        LinkSpeed::from_mbps(mbps)
    }
}

impl From<LinkSpeed> for u32 {
    fn from(speed: LinkSpeed) -> u32 {
        speed.0
    }
}

/// Duplex mode of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Duplex {
    Half,
    #[default]
    Full,
}

/// How the MAC learns link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhyLinkMode {
    /// Parameters come from an attached PHY.
    #[default]
    Phy,
    /// Fixed link, no PHY.
    Fixed,
    /// In-band status (e.g. SGMII).
    Inband,
}
