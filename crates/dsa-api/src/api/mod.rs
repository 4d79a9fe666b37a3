//! Capability interfaces between the DSA core, switch drivers and the host.
//!
//! - [`driver`]: the [`SwitchDriver`] trait, one implementation per switch family
//! - [`port`]: PHY link parameters for port enable and phylink calls
//! - [`fdb`]: static MAC table entries

pub mod driver;
pub mod fdb;
pub mod port;

pub use driver::{LinkTransmit, RecvFilter, SwitchDriver};
pub use fdb::MacTableEntry;
pub use port::{PhyLinkConfig, PhyLinkState};
