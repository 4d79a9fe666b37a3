//! A complete fabric built from a [`TopologyConfig`].
//!
//! Interfaces live in an [`IfaceTable`], the switch runs the
//! [`TailTagDriver`], and the master's transmit captures frames instead of
//! putting them on a wire.

use std::sync::Arc;

use dsa_api::{DsaError, DsaResult, Frame, IfaceId, LinkTransmit, RecvFilter, SwitchId};
use dsa_types::PortClass;
use log::info;
use parking_lot::Mutex;

use crate::config::{LagOp, TopologyConfig};
use crate::lag::LagSnapshot;
use crate::link::{IfaceTable, LinkLayer};
use crate::registry::Registry;
use crate::tag::TailTagDriver;

/// Accepts a frame for its slave unless it is addressed to the IEEE 802.1D
/// link-local range; STP, LACP and pause frames stay on the master.
pub fn slave_delivery_filter() -> RecvFilter {
    Arc::new(|_: IfaceId, frame: &Frame| {
        !frame.dst_mac().is_some_and(|mac| mac.is_link_local())
    })
}

pub struct Fabric {
    link: Arc<IfaceTable>,
    registry: Registry,
    driver: Arc<TailTagDriver>,
    switch: SwitchId,
    master: IfaceId,
    slaves: Vec<IfaceId>,
    wire: Arc<Mutex<Vec<Frame>>>,
}

impl std::fmt::Debug for Fabric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fabric")
            .field("switch", &self.switch)
            .field("master", &self.master)
            .field("ifaces", &self.link.len())
            .finish()
    }
}

impl Fabric {
    pub fn build(config: &TopologyConfig) -> DsaResult<Self> {
        let link = Arc::new(IfaceTable::new());
        let registry = Registry::new(link.clone());
        let driver = Arc::new(TailTagDriver::new());
        let switch = registry.attach_switch(&config.switch, driver.clone())?;

        let master = link.add_ethernet(config.master.as_str(), PortClass::Master);
        let wire: Arc<Mutex<Vec<Frame>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = wire.clone();
        let tx: Arc<dyn LinkTransmit> = Arc::new(move |_: IfaceId, frame: Frame| -> DsaResult<()> {
            captured.lock().push(frame);
            Ok(())
        });
        registry.register_master(switch, master, tx)?;

        let mut slaves = Vec::with_capacity(config.slaves.len());
        for name in &config.slaves {
            let slave = link.add_ethernet(name.as_str(), PortClass::Slave);
            registry.add_slave(switch, slave)?;
            slaves.push(slave);
        }
        info!(
            "Fabric {} up: master {} with {} slaves",
            config.switch.name,
            config.master,
            config.slaves.len()
        );

        Ok(Self {
            link,
            registry,
            driver,
            switch,
            master,
            slaves,
            wire,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn link(&self) -> &Arc<IfaceTable> {
        &self.link
    }

    pub fn driver(&self) -> &Arc<TailTagDriver> {
        &self.driver
    }

    pub fn switch(&self) -> SwitchId {
        self.switch
    }

    pub fn master(&self) -> IfaceId {
        self.master
    }

    /// Slave interfaces in port order.
    pub fn slaves(&self) -> &[IfaceId] {
        &self.slaves
    }

    /// Installs [`slave_delivery_filter`] on every slave.
    pub fn deliver_to_slaves(&self) -> DsaResult<()> {
        for &slave in &self.slaves {
            self.registry
                .register_receive_filter(slave, Some(slave_delivery_filter()))?;
        }
        Ok(())
    }

    pub fn iface(&self, name: &str) -> DsaResult<IfaceId> {
        self.link
            .by_name(name)
            .ok_or_else(|| DsaError::not_found(format!("interface {}", name)))
    }

    pub fn iface_name(&self, iface: IfaceId) -> String {
        self.link.name(iface).unwrap_or_else(|| iface.to_string())
    }

    pub fn apply_lag(&self, op: &LagOp) -> DsaResult<()> {
        match *op {
            LagOp::Join { port, .. } => self.registry.lag_join(self.switch, port, op.group()),
            LagOp::Leave { port, .. } => self.registry.lag_leave(self.switch, port, op.group()),
            LagOp::Change { port, .. } => self.registry.lag_change(self.switch, port, op.group()),
        }
    }

    pub fn lag_snapshot(&self) -> DsaResult<LagSnapshot> {
        self.registry.lag_snapshot(self.switch)
    }

    /// Frames handed to the master's transmit so far, oldest first.
    pub fn take_wire(&self) -> Vec<Frame> {
        std::mem::take(&mut *self.wire.lock())
    }
}
