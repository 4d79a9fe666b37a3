//! Switch driver implementations shipped with the core.
//!
//! - [`tail`]: one trailing tag byte per frame (KSZ-style switches)

pub mod tail;

pub use tail::{LagEvent, PortState, TailTagDriver, VlanMembership};
