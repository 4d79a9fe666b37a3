//! Switch driver capability trait.
//!
//! A switch family implements [`SwitchDriver`] once; the DSA core resolves
//! the implementation when the switch attaches and keeps it as
//! `Arc<dyn SwitchDriver>` for the lifetime of the switch instance.
//!
//! Every capability has a default body returning
//! [`DsaError::NoCapability`], so a driver only implements what its chip
//! supports. The core treats a missing `resolve_port` as "pass everything
//! through to the master"; every other missing capability is a hard error
//! for the caller.

use std::sync::Arc;

use dsa_types::VlanId;

use super::fdb::MacTableEntry;
use super::port::{PhyLinkConfig, PhyLinkState};
use crate::error::{DsaError, DsaResult};
use crate::frame::Frame;
use crate::types::{IfaceId, LagAssignment, PortMap};

/// Capabilities the DSA core requires from a vendor switch driver.
///
/// Methods run synchronously on the caller's thread (receive path, transmit
/// path or an administrative thread) and must not block.
pub trait SwitchDriver: Send + Sync {
    /// Returns the switch family name (for logging).
    fn name(&self) -> &str;

    /// Works out which interface a frame arriving on `arriving` belongs to.
    ///
    /// The driver may strip its tag from `frame`. `Ok(None)` leaves the
    /// frame on the arriving interface.
    fn resolve_port(
        &self,
        ports: &PortMap<'_>,
        arriving: IfaceId,
        frame: &mut Frame,
    ) -> DsaResult<Option<IfaceId>> {
        let _ = (ports, arriving, frame);
        Err(DsaError::no_capability("resolve_port"))
    }

    /// Adds the vendor tag for `iface` (a slave, or the master itself).
    fn inject_tag(&self, ports: &PortMap<'_>, iface: IfaceId, frame: Frame) -> DsaResult<Frame> {
        let _ = (ports, iface, frame);
        Err(DsaError::no_capability("inject_tag"))
    }

    /// Reads a switch register.
    fn switch_read(&self, reg: u16) -> DsaResult<u8> {
        let _ = reg;
        Err(DsaError::no_capability("switch_read"))
    }

    /// Writes a switch register.
    fn switch_write(&self, reg: u16, value: u8) -> DsaResult<()> {
        let _ = (reg, value);
        Err(DsaError::no_capability("switch_write"))
    }

    /// Reads a static MAC table entry.
    fn mac_table_get(&self, index: u16) -> DsaResult<MacTableEntry> {
        let _ = index;
        Err(DsaError::no_capability("mac_table_get"))
    }

    /// Writes a static MAC table entry.
    fn mac_table_set(&self, entry: &MacTableEntry, index: u16, flags: u16) -> DsaResult<()> {
        let _ = (entry, index, flags);
        Err(DsaError::no_capability("mac_table_set"))
    }

    fn port_enable(&self, port: usize, link: &PhyLinkState) -> DsaResult<()> {
        let _ = (port, link);
        Err(DsaError::no_capability("port_enable"))
    }

    fn port_disable(&self, port: usize) -> DsaResult<()> {
        let _ = port;
        Err(DsaError::no_capability("port_disable"))
    }

    /// Configures the MAC once the PHY reports link up.
    fn phylink_mac_link_up(&self, port: usize, config: &PhyLinkConfig) -> DsaResult<()> {
        let _ = (port, config);
        Err(DsaError::no_capability("phylink_mac_link_up"))
    }

    fn port_vlan_filtering(&self, port: usize, enable: bool) -> DsaResult<()> {
        let _ = (port, enable);
        Err(DsaError::no_capability("port_vlan_filtering"))
    }

    fn port_vlan_add(&self, port: usize, vid: VlanId, untagged: bool, pvid: bool) -> DsaResult<()> {
        let _ = (port, vid, untagged, pvid);
        Err(DsaError::no_capability("port_vlan_add"))
    }

    fn port_vlan_del(&self, port: usize, vid: VlanId) -> DsaResult<()> {
        let _ = (port, vid);
        Err(DsaError::no_capability("port_vlan_del"))
    }

    /// Programs `port` into the hardware LAG described by `lag`.
    fn lag_join(&self, port: usize, lag: LagAssignment) -> DsaResult<()> {
        let _ = (port, lag);
        Err(DsaError::no_capability("lag_join"))
    }

    /// Removes `port` from the hardware LAG. `lag.valid` is false.
    fn lag_leave(&self, port: usize, lag: LagAssignment) -> DsaResult<()> {
        let _ = (port, lag);
        Err(DsaError::no_capability("lag_leave"))
    }

    /// Re-reads the LAG membership of `port` after a change.
    fn lag_change(&self, port: usize) -> DsaResult<()> {
        let _ = port;
        Err(DsaError::no_capability("lag_change"))
    }
}

/// The bare link-layer transmit of a master interface.
///
/// Recorded once per master; the egress path calls it with frames that are
/// already tagged.
pub trait LinkTransmit: Send + Sync {
    fn send(&self, device: IfaceId, frame: Frame) -> DsaResult<()>;
}

impl<F> LinkTransmit for F
where
    F: Fn(IfaceId, Frame) -> DsaResult<()> + Send + Sync,
{
    fn send(&self, device: IfaceId, frame: Frame) -> DsaResult<()> {
        self(device, frame)
    }
}

/// Software receive policy attached to a DSA interface.
///
/// Returning `true` accepts delivery to the interface the driver resolved;
/// `false` keeps the frame on the interface it arrived on.
pub type RecvFilter = Arc<dyn Fn(IfaceId, &Frame) -> bool + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LagId;

    struct BareDriver;

    impl SwitchDriver for BareDriver {
        fn name(&self) -> &str {
            "bare"
        }
    }

    #[test]
    fn test_default_capabilities_are_missing() {
        let driver = BareDriver;
        let ports = PortMap::new(None, &[]);
        let iface = IfaceId::from_raw_unchecked(1);

        let err = driver
            .resolve_port(&ports, iface, &mut Frame::default())
            .unwrap_err();
        assert!(err.is_missing_capability());
        assert!(driver.inject_tag(&ports, iface, Frame::default()).is_err());
        assert!(driver.switch_read(0).is_err());
        assert_eq!(
            driver.lag_join(0, LagAssignment::assigned(LagId::new(1))),
            Err(DsaError::no_capability("lag_join"))
        );
    }

    #[test]
    fn test_closure_transmit() {
        let tx = |_dev: IfaceId, frame: Frame| -> DsaResult<()> {
            assert_eq!(frame.len(), 3);
            Ok(())
        };
        let tx: &dyn LinkTransmit = &tx;
        assert!(tx
            .send(IfaceId::from_raw_unchecked(1), Frame::new(vec![1, 2, 3]))
            .is_ok());
    }
}
