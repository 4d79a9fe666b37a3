//! Vendor switch driver boundary for the DSA fabric.
//!
//! This crate defines everything a switch-family driver and the DSA core
//! exchange, without depending on how the core routes frames:
//!
//! - [`types`]: type-safe interface and switch handles, LAG records, port maps
//! - [`frame`]: the owned frame buffer handed across the boundary
//! - [`error`]: POSIX-style status codes and the [`DsaError`] type
//! - [`api`]: the [`SwitchDriver`] capability trait and transmit/filter hooks
//!
//! # Example
//!
//! ```ignore
//! use dsa_api::{DsaResult, Frame, IfaceId, PortMap, SwitchDriver};
//!
//! struct MyChip;
//!
//! impl SwitchDriver for MyChip {
//!     fn name(&self) -> &str { "mychip" }
//!
//!     fn inject_tag(&self, ports: &PortMap<'_>, iface: IfaceId, frame: Frame) -> DsaResult<Frame> {
//!         // append the vendor header for `ports.port_of(iface)`
//!         Ok(frame)
//!     }
//! }
//! ```

pub mod api;
pub mod error;
pub mod frame;
pub mod types;

pub use api::{
    LinkTransmit, MacTableEntry, PhyLinkConfig, PhyLinkState, RecvFilter, SwitchDriver,
};
pub use error::{to_errno, DsaError, DsaResult, DsaStatus, DsaStatusExt};
pub use frame::Frame;
pub use types::{
    Handle, HandleKind, IfaceId, IfaceKind, LagAssignment, LagId, PortMap, SwitchId, SwitchKind,
};
