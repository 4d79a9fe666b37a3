//! Common types for the Distributed Switch Architecture (DSA) fabric.
//!
//! This crate provides type-safe representations of the primitives shared
//! by the DSA registry, the frame routing hooks and the vendor driver
//! boundary:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`VlanId`]: IEEE 802.1Q VLAN identifiers
//! - [`LinkKind`], [`EthCapabilities`], [`PortClass`]: interface classification
//! - [`LinkSpeed`], [`Duplex`], [`PhyLinkMode`]: PHY link parameters

mod link;
mod mac;
mod phy;
mod vlan;

pub use link::{EthCapabilities, LinkKind, PortClass};
pub use mac::MacAddress;
pub use phy::{Duplex, LinkSpeed, PhyLinkMode};
pub use vlan::VlanId;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("invalid link speed: {0}")]
    InvalidLinkSpeed(String),
}
