//! Link-layer kinds, Ethernet capability flags and DSA port classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Link-layer binding of a network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// IEEE 802.3 Ethernet.
    #[default]
    Ethernet,
    /// Software loopback.
    Loopback,
    /// Point-to-point link (PPP, tunnels).
    PointToPoint,
    /// Anything else the host stack knows about.
    Other,
}

impl LinkKind {
    /// Returns true if this is an Ethernet binding.
    pub const fn is_ethernet(&self) -> bool {
        matches!(self, LinkKind::Ethernet)
    }
}

bitflags::bitflags! {
    /// Hardware capability flags reported by an Ethernet interface.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EthCapabilities: u32 {
        const TX_CHECKSUM_OFFLOAD = 1 << 0;
        const RX_CHECKSUM_OFFLOAD = 1 << 1;
        const HW_VLAN             = 1 << 2;
        const AUTO_NEGOTIATION    = 1 << 3;
        const LINK_10BASE_T       = 1 << 4;
        const LINK_100BASE_T      = 1 << 5;
        const LINK_1000BASE_T     = 1 << 6;
        const PROMISC_MODE        = 1 << 7;
        /// The interface is the conduit between host and switch chip.
        const DSA_MASTER_PORT     = 1 << 8;
        /// The interface is a logical port behind a DSA master.
        const DSA_SLAVE_PORT      = 1 << 9;
    }
}

impl EthCapabilities {
    /// Returns true if either DSA role flag is set.
    pub const fn is_dsa_port(&self) -> bool {
        self.intersects(Self::DSA_MASTER_PORT.union(Self::DSA_SLAVE_PORT))
    }
}

/// DSA classification of a network interface.
///
/// Derived from the link kind and the capability flags; never stored.
/// An interface reporting both role flags classifies as [`PortClass::Master`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortClass {
    /// Not part of any DSA fabric.
    #[default]
    Plain,
    /// The physical conduit towards the switch chip.
    Master,
    /// A logical per-port interface behind the master.
    Slave,
}

impl PortClass {
    /// Classifies an interface from its link kind and capabilities.
    pub fn classify(kind: LinkKind, caps: EthCapabilities) -> Self {
        if !kind.is_ethernet() {
            return PortClass::Plain;
        }
        if caps.contains(EthCapabilities::DSA_MASTER_PORT) {
            PortClass::Master
        } else if caps.contains(EthCapabilities::DSA_SLAVE_PORT) {
            PortClass::Slave
        } else {
            PortClass::Plain
        }
    }

    /// Returns true for master or slave.
    pub const fn is_dsa(&self) -> bool {
        matches!(self, PortClass::Master | PortClass::Slave)
    }
}

impl fmt::Display for PortClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortClass::Plain => "plain",
            PortClass::Master => "master",
            PortClass::Slave => "slave",
        };
        write!(f, "{}", s)
    }
}
