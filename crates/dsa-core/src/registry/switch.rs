//! Per-switch state.

use std::sync::Arc;

use dsa_api::{DsaError, DsaResult, IfaceId, PortMap, SwitchDriver, SwitchId};

use crate::config::SwitchConfig;
use crate::lag::LagTable;

/// One managed switch: its master, ordered slaves and LAG table.
///
/// Tables are sized from the [`SwitchConfig`] at attach and never grow past
/// it.
pub struct SwitchInstance {
    id: SwitchId,
    name: String,
    driver: Arc<dyn SwitchDriver>,
    master: Option<IfaceId>,
    slaves: Vec<IfaceId>,
    max_ports: usize,
    lag: LagTable,
}

impl std::fmt::Debug for SwitchInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("driver", &self.driver.name())
            .field("master", &self.master)
            .field("slaves", &self.slaves)
            .field("lag_groups", &self.lag.active_groups())
            .finish()
    }
}

impl SwitchInstance {
    pub(crate) fn new(id: SwitchId, config: &SwitchConfig, driver: Arc<dyn SwitchDriver>) -> Self {
        Self {
            id,
            name: config.name.clone(),
            driver,
            master: None,
            slaves: Vec::with_capacity(config.max_ports),
            max_ports: config.max_ports,
            lag: LagTable::new(config.max_ports, config.lag_capacity),
        }
    }

    pub fn id(&self) -> SwitchId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn driver(&self) -> &Arc<dyn SwitchDriver> {
        &self.driver
    }

    pub fn master(&self) -> Option<IfaceId> {
        self.master
    }

    pub(crate) fn set_master(&mut self, master: IfaceId) {
        self.master = Some(master);
    }

    pub fn slaves(&self) -> &[IfaceId] {
        &self.slaves
    }

    pub fn max_ports(&self) -> usize {
        self.max_ports
    }

    /// Appends a slave and returns its port number.
    pub(crate) fn push_slave(&mut self, iface: IfaceId) -> DsaResult<usize> {
        if let Some(port) = self.slaves.iter().position(|s| *s == iface) {
            return Ok(port);
        }
        if self.slaves.len() >= self.max_ports {
            return Err(DsaError::OutOfPorts {
                capacity: self.max_ports,
            });
        }
        self.slaves.push(iface);
        Ok(self.slaves.len() - 1)
    }

    /// View lent to the driver.
    pub fn port_map(&self) -> PortMap<'_> {
        PortMap::new(self.master, &self.slaves)
    }

    pub fn lag(&self) -> &LagTable {
        &self.lag
    }

    pub(crate) fn lag_mut(&mut self) -> &mut LagTable {
        &mut self.lag
    }
}
