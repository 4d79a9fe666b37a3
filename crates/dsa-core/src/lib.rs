//! DSA fabric core.
//!
//! One master link multiplexed into per-port slave interfaces behind a
//! managed switch chip.
//!
//! # Architecture
//!
//! ```text
//!                 receive()                       transmit()
//! [wire] ──> master ──> [Ingress] ──> slave      slave ──> [Egress] ──> master tx ──> [wire]
//!                          │                                  │
//!                          └──── SwitchDriver (tag format) ───┘
//!                                      │
//!                               [Registry] ── LAG table per switch
//! ```
//!
//! # Key Components
//!
//! - [`Registry`]: switches, interface contexts and classification
//! - [`Registry::receive`] / [`Registry::transmit`]: the host-facing hooks
//! - [`Registry::lag_join`], [`Registry::lag_leave`], [`Registry::lag_change`]:
//!   LAG management over a fixed group pool
//! - [`TailTagDriver`]: driver for one-byte tail-tag switches
//! - [`Fabric`]: wires a [`TopologyConfig`] into a running registry

pub mod config;
mod egress;
pub mod fabric;
mod ingress;
pub mod lag;
pub mod link;
mod ops;
pub mod registry;
pub mod sync_map;
pub mod tag;

pub use config::{ConfigError, LagOp, SwitchConfig, TopologyConfig, DSA_MAX_LAGS, DSA_MAX_PORTS};
pub use fabric::{slave_delivery_filter, Fabric};
pub use lag::{LagSnapshot, LagTable, LagTableStats};
pub use link::{IfaceTable, LinkLayer};
pub use registry::{IfaceContext, Registry, SwitchInstance, SwitchRef};
pub use sync_map::SyncMap;
pub use tag::TailTagDriver;
