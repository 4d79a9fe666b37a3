//! Transmit hook: tags frames and hands them to the master's recorded
//! untagged transmit.
//!
//! A tag is always injected before anything reaches the wire. A slave
//! never transmits on its own path; its frames go out through the master.

use std::sync::Arc;

use dsa_api::{DsaError, DsaResult, Frame, IfaceId, LinkTransmit};
use dsa_types::PortClass;
use log::{debug, error};

use crate::registry::Registry;

impl Registry {
    /// Transmits `frame` from `device`.
    pub fn transmit(&self, device: IfaceId, frame: Frame) -> DsaResult<()> {
        match self.classify(device) {
            PortClass::Master => self.transmit_from_master(device, frame),
            PortClass::Slave => self.transmit_from_slave(device, frame),
            PortClass::Plain => Err(self.unclassified(device)),
        }
    }

    fn transmit_from_master(&self, master: IfaceId, frame: Frame) -> DsaResult<()> {
        let switch = self.switch_of(master).ok_or_else(|| {
            error!("Master {} is not bound to a switch", self.iface_name(master));
            DsaError::no_capability("inject_tag")
        })?;
        let tagged = {
            let sw = self.switch(switch)?;
            let sw = sw.read();
            sw.driver().inject_tag(&sw.port_map(), master, frame)?
        };
        self.send_on_master(master, tagged)
    }

    fn transmit_from_slave(&self, slave: IfaceId, frame: Frame) -> DsaResult<()> {
        let switch = self.switch_of(slave).ok_or_else(|| {
            DsaError::not_found(format!("switch of {}", self.iface_name(slave)))
        })?;
        let (master, tagged) = {
            let sw = self.switch(switch)?;
            let sw = sw.read();
            let Some(master) = sw.master() else {
                error!(
                    "Cannot transmit from {}: {} has no master",
                    self.iface_name(slave),
                    switch
                );
                return Err(DsaError::NoMaster { switch });
            };
            let tagged = sw.driver().inject_tag(&sw.port_map(), slave, frame)?;
            (master, tagged)
        };
        debug!(
            "{} -> {} ({} bytes tagged)",
            self.iface_name(slave),
            self.iface_name(master),
            tagged.len()
        );
        self.send_on_master(master, tagged)
    }

    fn send_on_master(&self, master: IfaceId, mut frame: Frame) -> DsaResult<()> {
        let tx: Arc<dyn LinkTransmit> = self
            .context(master)
            .and_then(|ctx| ctx.master_tx)
            .ok_or_else(|| {
                error!("No recorded transmit for master {}", self.iface_name(master));
                DsaError::no_capability("master transmit")
            })?;
        frame.set_iface(master);
        tx.send(master, frame)
    }
}
