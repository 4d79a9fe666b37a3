//! Topology registry.
//!
//! Holds every switch instance and the per-interface contexts the routing
//! hooks consult. Each switch sits behind its own `RwLock`: the receive and
//! transmit hooks take it shared, LAG operations and registration take it
//! exclusive. Interface contexts share one `RwLock`.
//!
//! Lock order is interface table first, then a switch; neither is held
//! while a receive filter or a master transmit runs.

mod iface;
mod switch;

pub use iface::IfaceContext;
pub use switch::SwitchInstance;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dsa_api::{
    DsaError, DsaResult, IfaceId, LinkTransmit, RecvFilter, SwitchDriver, SwitchId,
};
use dsa_types::PortClass;
use log::{debug, info};
use parking_lot::RwLock;

use crate::config::SwitchConfig;
use crate::link::LinkLayer;
use crate::sync_map::SyncMap;

/// Shared handle to one switch instance.
pub type SwitchRef = Arc<RwLock<SwitchInstance>>;

/// Registry of switches and interface contexts.
pub struct Registry {
    link: Arc<dyn LinkLayer>,
    switches: RwLock<SyncMap<SwitchId, SwitchRef>>,
    ifaces: RwLock<SyncMap<IfaceId, IfaceContext>>,
    next_switch: AtomicU32,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("switches", &self.switches.read().len())
            .field("ifaces", &self.ifaces.read().len())
            .finish()
    }
}

impl Registry {
    pub fn new(link: Arc<dyn LinkLayer>) -> Self {
        Self {
            link,
            switches: RwLock::new(SyncMap::new()),
            ifaces: RwLock::new(SyncMap::new()),
            next_switch: AtomicU32::new(1),
        }
    }

    pub fn link(&self) -> &Arc<dyn LinkLayer> {
        &self.link
    }

    /// Interface name for log lines; falls back to the handle.
    pub(crate) fn iface_name(&self, iface: IfaceId) -> String {
        self.link
            .name(iface)
            .unwrap_or_else(|| iface.to_string())
    }

    /// Creates a switch instance sized by `config` and bound to `driver`.
    pub fn attach_switch(
        &self,
        config: &SwitchConfig,
        driver: Arc<dyn SwitchDriver>,
    ) -> DsaResult<SwitchId> {
        config
            .validate()
            .map_err(|e| DsaError::invalid_argument(e.to_string()))?;

        let id = SwitchId::from_raw_unchecked(self.next_switch.fetch_add(1, Ordering::Relaxed));
        info!(
            "Attached switch {} ({}) driver={} ports={} lags={}",
            config.name,
            id,
            driver.name(),
            config.max_ports,
            config.lag_capacity
        );
        let instance = SwitchInstance::new(id, config, driver);
        self.switches
            .write()
            .insert(id, Arc::new(RwLock::new(instance)));
        Ok(id)
    }

    /// Returns the switch instance for `id`.
    pub fn switch(&self, id: SwitchId) -> DsaResult<SwitchRef> {
        self.switches
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| DsaError::not_found(format!("switch {}", id)))
    }

    pub fn switch_count(&self) -> usize {
        self.switches.read().len()
    }

    /// Appends `iface` as the next slave port of `switch`.
    ///
    /// Returns the port number. Adding the same interface twice returns its
    /// existing port.
    pub fn add_slave(&self, switch: SwitchId, iface: IfaceId) -> DsaResult<usize> {
        let sw = self.switch(switch)?;
        let mut ifaces = self.ifaces.write();
        let port = sw.write().push_slave(iface)?;
        ifaces.get_or_insert_with(iface, IfaceContext::default).switch = Some(switch);
        info!(
            "Added slave {} as port {} of {}",
            self.iface_name(iface),
            port,
            switch
        );
        Ok(port)
    }

    /// Records the master's untagged transmit and binds it to `switch`.
    ///
    /// Registering again overwrites the previous entry-point.
    pub fn register_master(
        &self,
        switch: SwitchId,
        master: IfaceId,
        tx: Arc<dyn LinkTransmit>,
    ) -> DsaResult<()> {
        let sw = self.switch(switch)?;
        let mut ifaces = self.ifaces.write();
        sw.write().set_master(master);
        let ctx = ifaces.get_or_insert_with(master, IfaceContext::default);
        ctx.master_tx = Some(tx);
        ctx.switch = Some(switch);
        info!("Registered master {} for {}", self.iface_name(master), switch);
        Ok(())
    }

    /// Attaches a receive filter to a DSA interface.
    ///
    /// `None` is accepted and keeps whatever filter was there.
    pub fn register_receive_filter(
        &self,
        iface: IfaceId,
        filter: Option<RecvFilter>,
    ) -> DsaResult<()> {
        if !self.classify(iface).is_dsa() {
            return Err(self.unclassified(iface));
        }
        let Some(filter) = filter else {
            debug!("No filter given for {}, keeping current", self.iface_name(iface));
            return Ok(());
        };
        self.ifaces
            .write()
            .get_or_insert_with(iface, IfaceContext::default)
            .recv_filter = Some(filter);
        info!("Registered receive filter on {}", self.iface_name(iface));
        Ok(())
    }

    /// Returns the slave at `index` of `switch`.
    pub fn resolve_slave(&self, switch: SwitchId, index: i32) -> DsaResult<IfaceId> {
        let sw = self.switch(switch)?;
        let sw = sw.read();
        sw.port_map()
            .slave(i64::from(index))
            .ok_or_else(|| DsaError::not_found(format!("slave {} of {}", index, switch)))
    }

    /// Classifies `iface` from the link layer's current view.
    pub fn classify(&self, iface: IfaceId) -> PortClass {
        match self.link.link_kind(iface) {
            Some(kind) => PortClass::classify(kind, self.link.capabilities(iface)),
            None => PortClass::Plain,
        }
    }

    pub fn is_master(&self, iface: IfaceId) -> bool {
        self.classify(iface) == PortClass::Master
    }

    pub fn is_slave(&self, iface: IfaceId) -> bool {
        self.classify(iface) == PortClass::Slave
    }

    /// The switch `iface` is bound to as master or slave.
    pub fn switch_of(&self, iface: IfaceId) -> Option<SwitchId> {
        self.ifaces.read().get(&iface).and_then(|ctx| ctx.switch)
    }

    /// Snapshot of the context of `iface`.
    pub fn context(&self, iface: IfaceId) -> Option<IfaceContext> {
        self.ifaces.read().get(&iface).cloned()
    }

    pub(crate) fn unclassified(&self, iface: IfaceId) -> DsaError {
        let not_ethernet = !self
            .link
            .link_kind(iface)
            .is_some_and(|kind| kind.is_ethernet());
        DsaError::Unclassified {
            iface,
            not_ethernet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::IfaceTable;
    use dsa_api::{DsaStatus, Frame};
    use dsa_types::{EthCapabilities, LinkKind};
    use pretty_assertions::assert_eq;

    struct NullDriver;

    impl SwitchDriver for NullDriver {
        fn name(&self) -> &str {
            "null"
        }
    }

    fn setup(max_ports: usize) -> (Arc<IfaceTable>, Registry, SwitchId) {
        let link = Arc::new(IfaceTable::new());
        let registry = Registry::new(link.clone());
        let config = SwitchConfig::new("sw0").with_max_ports(max_ports);
        let switch = registry.attach_switch(&config, Arc::new(NullDriver)).unwrap();
        (link, registry, switch)
    }

    fn null_tx() -> Arc<dyn LinkTransmit> {
        Arc::new(|_: IfaceId, _: Frame| -> DsaResult<()> { Ok(()) })
    }

    #[test]
    fn test_attach_rejects_bad_config() {
        let registry = Registry::new(Arc::new(IfaceTable::new()));
        let config = SwitchConfig::new("sw0").with_lag_capacity(0);
        let err = registry
            .attach_switch(&config, Arc::new(NullDriver))
            .unwrap_err();
        assert_eq!(err.status(), DsaStatus::InvalidArgument);
        assert_eq!(registry.switch_count(), 0);
    }

    #[test]
    fn test_resolve_slave_bounds() {
        let (link, registry, switch) = setup(4);
        let lan1 = link.add_ethernet("lan1", PortClass::Slave);
        let lan2 = link.add_ethernet("lan2", PortClass::Slave);
        assert_eq!(registry.add_slave(switch, lan1), Ok(0));
        assert_eq!(registry.add_slave(switch, lan2), Ok(1));

        assert_eq!(registry.resolve_slave(switch, 0), Ok(lan1));
        assert_eq!(registry.resolve_slave(switch, 1), Ok(lan2));
        assert!(registry.is_slave(registry.resolve_slave(switch, 1).unwrap()));
        for bad in [-1, 2, 3, i32::MAX, i32::MIN] {
            assert!(matches!(
                registry.resolve_slave(switch, bad),
                Err(DsaError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn test_add_slave_capacity() {
        let (link, registry, switch) = setup(1);
        let lan1 = link.add_ethernet("lan1", PortClass::Slave);
        let lan2 = link.add_ethernet("lan2", PortClass::Slave);
        registry.add_slave(switch, lan1).unwrap();
        assert_eq!(registry.add_slave(switch, lan1), Ok(0));
        let err = registry.add_slave(switch, lan2).unwrap_err();
        assert_eq!(err, DsaError::OutOfPorts { capacity: 1 });
        assert_eq!(err.errno(), -28);
        assert_eq!(registry.switch_of(lan2), None);
    }

    #[test]
    fn test_register_master_binds_and_overwrites() {
        let (link, registry, switch) = setup(4);
        let eth0 = link.add_ethernet("eth0", PortClass::Master);
        registry.register_master(switch, eth0, null_tx()).unwrap();
        registry.register_master(switch, eth0, null_tx()).unwrap();
        assert_eq!(registry.switch_of(eth0), Some(switch));
        assert!(registry.context(eth0).unwrap().master_tx.is_some());
        assert_eq!(registry.switch(switch).unwrap().read().master(), Some(eth0));
    }

    #[test]
    fn test_register_master_unknown_switch() {
        let (link, registry, _) = setup(4);
        let eth0 = link.add_ethernet("eth0", PortClass::Master);
        let ghost = SwitchId::from_raw_unchecked(99);
        assert!(registry.register_master(ghost, eth0, null_tx()).is_err());
        assert!(registry.context(eth0).is_none());
    }

    #[test]
    fn test_classification_follows_link_layer() {
        let (link, registry, _) = setup(4);
        let eth1 = link.add_ethernet("eth1", PortClass::Plain);
        assert_eq!(registry.classify(eth1), PortClass::Plain);

        link.set_capabilities(eth1, EthCapabilities::DSA_SLAVE_PORT)
            .unwrap();
        assert!(registry.is_slave(eth1));

        link.set_capabilities(
            eth1,
            EthCapabilities::DSA_SLAVE_PORT | EthCapabilities::DSA_MASTER_PORT,
        )
        .unwrap();
        assert!(registry.is_master(eth1));
        assert!(!registry.is_slave(eth1));
    }

    #[test]
    fn test_register_filter_requires_dsa_port() {
        let (link, registry, _) = setup(4);
        let plain = link.add_ethernet("eth1", PortClass::Plain);
        let lo = link.add("lo", LinkKind::Loopback, EthCapabilities::DSA_SLAVE_PORT);
        let filter: RecvFilter = Arc::new(|_: IfaceId, _: &Frame| true);

        let err = registry
            .register_receive_filter(plain, Some(filter.clone()))
            .unwrap_err();
        assert_eq!(err.errno(), -3);
        let err = registry
            .register_receive_filter(lo, Some(filter))
            .unwrap_err();
        assert_eq!(err.errno(), -2);
    }

    #[test]
    fn test_register_none_filter_keeps_previous() {
        let (link, registry, _) = setup(4);
        let lan1 = link.add_ethernet("lan1", PortClass::Slave);
        registry
            .register_receive_filter(lan1, Some(Arc::new(|_: IfaceId, _: &Frame| true)))
            .unwrap();
        registry.register_receive_filter(lan1, None).unwrap();
        assert!(registry.context(lan1).unwrap().recv_filter.is_some());
    }
}
