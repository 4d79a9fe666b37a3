//! Forwarding calls to the switch driver.
//!
//! Each call resolves the switch, clones its driver out of the lock and
//! returns whatever the driver returns.

use std::sync::Arc;

use dsa_api::{DsaResult, MacTableEntry, PhyLinkConfig, PhyLinkState, SwitchDriver, SwitchId};
use dsa_types::VlanId;
use log::debug;

use crate::registry::Registry;

impl Registry {
    fn driver_of(&self, switch: SwitchId) -> DsaResult<Arc<dyn SwitchDriver>> {
        Ok(self.switch(switch)?.read().driver().clone())
    }

    pub fn switch_read(&self, switch: SwitchId, reg: u16) -> DsaResult<u8> {
        debug!("{} read reg {:#06x}", switch, reg);
        self.driver_of(switch)?.switch_read(reg)
    }

    pub fn switch_write(&self, switch: SwitchId, reg: u16, value: u8) -> DsaResult<()> {
        debug!("{} write reg {:#06x} = {:#04x}", switch, reg, value);
        self.driver_of(switch)?.switch_write(reg, value)
    }

    pub fn mac_table_get(&self, switch: SwitchId, index: u16) -> DsaResult<MacTableEntry> {
        debug!("{} MAC table get {}", switch, index);
        self.driver_of(switch)?.mac_table_get(index)
    }

    pub fn mac_table_set(
        &self,
        switch: SwitchId,
        entry: &MacTableEntry,
        index: u16,
        flags: u16,
    ) -> DsaResult<()> {
        debug!(
            "{} MAC table set {} {} -> port {} flags {:#x}",
            switch, index, entry.mac, entry.fw_port, flags
        );
        self.driver_of(switch)?.mac_table_set(entry, index, flags)
    }

    /// Enables `port` with link up, 1000BASE-T full duplex.
    pub fn port_enable(&self, switch: SwitchId, port: usize) -> DsaResult<()> {
        let link = PhyLinkState::default();
        debug!("{} enable port {} ({:?})", switch, port, link);
        self.driver_of(switch)?.port_enable(port, &link)
    }

    pub fn port_disable(&self, switch: SwitchId, port: usize) -> DsaResult<()> {
        debug!("{} disable port {}", switch, port);
        self.driver_of(switch)?.port_disable(port)
    }

    pub fn phylink_mac_link_up(
        &self,
        switch: SwitchId,
        port: usize,
        config: &PhyLinkConfig,
    ) -> DsaResult<()> {
        debug!("{} port {} MAC link up {:?}", switch, port, config);
        self.driver_of(switch)?.phylink_mac_link_up(port, config)
    }

    pub fn port_vlan_filtering(&self, switch: SwitchId, port: usize, enable: bool) -> DsaResult<()> {
        debug!("{} port {} VLAN filtering {}", switch, port, enable);
        self.driver_of(switch)?.port_vlan_filtering(port, enable)
    }

    pub fn port_vlan_add(
        &self,
        switch: SwitchId,
        port: usize,
        vid: VlanId,
        untagged: bool,
        pvid: bool,
    ) -> DsaResult<()> {
        debug!(
            "{} port {} add {} untagged={} pvid={}",
            switch, port, vid, untagged, pvid
        );
        self.driver_of(switch)?.port_vlan_add(port, vid, untagged, pvid)
    }

    pub fn port_vlan_del(&self, switch: SwitchId, port: usize, vid: VlanId) -> DsaResult<()> {
        debug!("{} port {} del {}", switch, port, vid);
        self.driver_of(switch)?.port_vlan_del(port, vid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsa_api::DsaError;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use crate::config::SwitchConfig;
    use crate::link::IfaceTable;

    #[derive(Default)]
    struct EnableOnly {
        enabled: Mutex<Vec<(usize, PhyLinkState)>>,
    }

    impl SwitchDriver for EnableOnly {
        fn name(&self) -> &str {
            "enable-only"
        }

        fn port_enable(&self, port: usize, link: &PhyLinkState) -> DsaResult<()> {
            self.enabled.lock().push((port, *link));
            Ok(())
        }
    }

    #[test]
    fn test_port_enable_supplies_defaults() {
        let registry = Registry::new(Arc::new(IfaceTable::new()));
        let driver = Arc::new(EnableOnly::default());
        let switch = registry
            .attach_switch(&SwitchConfig::new("sw0"), driver.clone())
            .unwrap();

        registry.port_enable(switch, 3).unwrap();
        assert_eq!(*driver.enabled.lock(), vec![(3, PhyLinkState::default())]);
    }

    #[test]
    fn test_missing_operation_is_hard_error() {
        let registry = Registry::new(Arc::new(IfaceTable::new()));
        let switch = registry
            .attach_switch(&SwitchConfig::new("sw0"), Arc::new(EnableOnly::default()))
            .unwrap();

        assert_eq!(
            registry.port_disable(switch, 0),
            Err(DsaError::no_capability("port_disable"))
        );
        assert_eq!(registry.switch_read(switch, 0).unwrap_err().errno(), -38);
    }

    #[test]
    fn test_unknown_switch() {
        let registry = Registry::new(Arc::new(IfaceTable::new()));
        let err = registry
            .switch_write(SwitchId::from_raw_unchecked(5), 0, 0)
            .unwrap_err();
        assert!(matches!(err, DsaError::NotFound { .. }));
    }
}
