//! Receive hook: picks the interface that should take an arriving frame.
//!
//! The hook never fails and never drops. Whenever it can't decide, the
//! frame stays on the interface it arrived on.

use dsa_api::{Frame, IfaceId};
use log::{debug, error, warn};

use crate::registry::Registry;

impl Registry {
    /// Routes a frame that arrived on `arriving`.
    ///
    /// The frame's owner is set to the returned interface.
    pub fn receive(&self, arriving: IfaceId, frame: &mut Frame) -> IfaceId {
        let chosen = self.dispatch(arriving, frame);
        frame.set_iface(chosen);
        chosen
    }

    fn dispatch(&self, arriving: IfaceId, frame: &mut Frame) -> IfaceId {
        let Some(switch) = self.switch_of(arriving) else {
            debug!("{} has no switch, frame stays", self.iface_name(arriving));
            return arriving;
        };
        let Ok(sw) = self.switch(switch) else {
            debug!("{} bound to missing {}, frame stays", self.iface_name(arriving), switch);
            return arriving;
        };

        let resolved = {
            let sw = sw.read();
            let ports = sw.port_map();
            match sw.driver().resolve_port(&ports, arriving, frame) {
                Ok(Some(iface)) => iface,
                Ok(None) => {
                    debug!("{}: driver kept frame on {}", switch, self.iface_name(arriving));
                    return arriving;
                }
                Err(e) if e.is_missing_capability() => {
                    error!(
                        "Driver {} of {} cannot resolve ports: {}",
                        sw.driver().name(),
                        switch,
                        e
                    );
                    return arriving;
                }
                Err(e) => {
                    warn!("{}: port resolution failed: {}", switch, e);
                    return arriving;
                }
            }
        };

        if !self.classify(resolved).is_dsa() {
            debug!(
                "{}: resolved {} is not a DSA port, delivering as-is",
                switch,
                self.iface_name(resolved)
            );
            return resolved;
        }

        let filter = self.context(resolved).and_then(|ctx| ctx.recv_filter);
        match filter {
            Some(filter) if filter(resolved, &*frame) => {
                debug!("{}: frame -> {}", switch, self.iface_name(resolved));
                resolved
            }
            Some(_) => {
                debug!(
                    "{}: filter on {} declined, frame stays on {}",
                    switch,
                    self.iface_name(resolved),
                    self.iface_name(arriving)
                );
                arriving
            }
            None => arriving,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use dsa_api::{DsaError, DsaResult, PortMap, SwitchDriver};
    use dsa_types::PortClass;
    use pretty_assertions::assert_eq;

    use crate::config::SwitchConfig;
    use crate::link::IfaceTable;

    /// Sends every frame to the slave numbered by its first byte.
    struct FirstByteDriver;

    impl SwitchDriver for FirstByteDriver {
        fn name(&self) -> &str {
            "first-byte"
        }

        fn resolve_port(
            &self,
            ports: &PortMap<'_>,
            _arriving: IfaceId,
            frame: &mut Frame,
        ) -> DsaResult<Option<IfaceId>> {
            match frame.data().first().copied() {
                Some(0xff) => Err(DsaError::invalid_argument("bad tag")),
                Some(port) => Ok(ports.slave(i64::from(port))),
                None => Ok(None),
            }
        }
    }

    struct Fixture {
        link: Arc<IfaceTable>,
        registry: Registry,
        eth0: IfaceId,
        lan1: IfaceId,
    }

    fn fixture() -> Fixture {
        let link = Arc::new(IfaceTable::new());
        let registry = Registry::new(link.clone());
        let switch = registry
            .attach_switch(&SwitchConfig::new("sw0"), Arc::new(FirstByteDriver))
            .unwrap();
        let eth0 = link.add_ethernet("eth0", PortClass::Master);
        let lan1 = link.add_ethernet("lan1", PortClass::Slave);
        registry
            .register_master(
                switch,
                eth0,
                Arc::new(|_: IfaceId, _: Frame| -> DsaResult<()> { Ok(()) }),
            )
            .unwrap();
        registry.add_slave(switch, lan1).unwrap();
        Fixture {
            link,
            registry,
            eth0,
            lan1,
        }
    }

    #[test]
    fn test_unbound_iface_passes_through() {
        let f = fixture();
        let eth9 = f.link.add_ethernet("eth9", PortClass::Master);
        let mut frame = Frame::new(vec![0]);
        assert_eq!(f.registry.receive(eth9, &mut frame), eth9);
        assert_eq!(frame.iface(), Some(eth9));
    }

    #[test]
    fn test_no_filter_keeps_arriving() {
        let f = fixture();
        let mut frame = Frame::new(vec![0]);
        assert_eq!(f.registry.receive(f.eth0, &mut frame), f.eth0);
    }

    #[test]
    fn test_filter_accepts_and_declines() {
        let f = fixture();
        f.registry
            .register_receive_filter(
                f.lan1,
                Some(Arc::new(|_: IfaceId, frame: &Frame| frame.len() > 1)),
            )
            .unwrap();

        let mut frame = Frame::new(vec![0, 1]);
        assert_eq!(f.registry.receive(f.eth0, &mut frame), f.lan1);
        assert_eq!(frame.iface(), Some(f.lan1));

        let mut frame = Frame::new(vec![0]);
        assert_eq!(f.registry.receive(f.eth0, &mut frame), f.eth0);
    }

    #[test]
    fn test_unresolved_and_failed_stay() {
        let f = fixture();
        let mut frame = Frame::new(vec![5]);
        assert_eq!(f.registry.receive(f.eth0, &mut frame), f.eth0);
        let mut frame = Frame::new(vec![0xff]);
        assert_eq!(f.registry.receive(f.eth0, &mut frame), f.eth0);
    }

    #[test]
    fn test_resolved_non_dsa_is_trusted() {
        let f = fixture();
        f.link
            .set_capabilities(f.lan1, dsa_types::EthCapabilities::empty())
            .unwrap();
        let mut frame = Frame::new(vec![0]);
        assert_eq!(f.registry.receive(f.eth0, &mut frame), f.lan1);
    }
}
