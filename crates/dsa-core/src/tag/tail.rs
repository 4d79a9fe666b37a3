//! Tail-tag switch driver.
//!
//! Frames towards the switch are padded to the Ethernet minimum and get one
//! trailing byte: `1 << port` to force egress on a port, or 0 to let the
//! switch look the destination up (frames sent by the master itself).
//! Frames from the switch carry the source port in the low bits of their
//! last byte.
//!
//! The chip itself is modelled in memory: a register file, the static MAC
//! table, per-port state and a log of LAG calls.

use std::collections::BTreeMap;

use dsa_api::frame::ETH_MIN_LEN;
use dsa_api::{
    DsaError, DsaResult, DsaStatus, DsaStatusExt, Frame, IfaceId, LagAssignment, MacTableEntry,
    PhyLinkConfig, PhyLinkState, PortMap, SwitchDriver,
};
use dsa_types::VlanId;
use log::{debug, trace};
use parking_lot::Mutex;

use crate::sync_map::SyncMap;

/// Tag value asking the switch to forward by MAC lookup.
pub const TAIL_TAG_LOOKUP: u8 = 0;

/// Ingress tag bits carrying the source port.
pub const TAIL_TAG_PORT_MASK: u8 = 0x07;

/// Ports addressable by a one-byte egress mask.
pub const TAIL_TAG_MAX_PORTS: usize = 8;

/// Static MAC table size.
pub const STATIC_MAC_ENTRIES: u16 = 32;

/// Registers decoded by the management bus; higher addresses fail with EIO.
pub const REGISTER_SPACE: u16 = 0x100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VlanMembership {
    pub untagged: bool,
    pub pvid: bool,
}

/// Modelled state of one switch port.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortState {
    pub enabled: bool,
    pub link: Option<PhyLinkState>,
    pub mac_link: Option<PhyLinkConfig>,
    pub vlan_filtering: bool,
    pub vlans: BTreeMap<VlanId, VlanMembership>,
}

/// One LAG call received from the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagEvent {
    Join { port: usize, lag: LagAssignment },
    Leave { port: usize, lag: LagAssignment },
    Change { port: usize },
}

#[derive(Debug, Default)]
pub struct TailTagDriver {
    registers: Mutex<SyncMap<u16, u8>>,
    mac_table: Mutex<SyncMap<u16, (MacTableEntry, u16)>>,
    ports: Mutex<SyncMap<usize, PortState>>,
    lag_events: Mutex<Vec<LagEvent>>,
}

fn check_port(port: usize) -> DsaResult<()> {
    if port >= TAIL_TAG_MAX_PORTS {
        return Err(DsaError::invalid_argument(format!(
            "port {} beyond tail tag range",
            port
        )));
    }
    Ok(())
}

/// Management bus status for an access to `reg`.
fn bus_status(reg: u16) -> i32 {
    if reg < REGISTER_SPACE {
        DsaStatus::Success.as_raw()
    } else {
        DsaStatus::Io.as_raw()
    }
}

fn check_mac_index(index: u16) -> DsaResult<()> {
    if index >= STATIC_MAC_ENTRIES {
        return Err(DsaError::invalid_argument(format!(
            "MAC table index {} out of range",
            index
        )));
    }
    Ok(())
}

impl TailTagDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Egress tag for a slave port.
    pub fn port_tag(port: usize) -> DsaResult<u8> {
        check_port(port)?;
        Ok(1u8 << port)
    }

    pub fn port_state(&self, port: usize) -> Option<PortState> {
        self.ports.lock().get(&port).cloned()
    }

    pub fn lag_events(&self) -> Vec<LagEvent> {
        self.lag_events.lock().clone()
    }

    /// Flags stored with a static MAC entry.
    pub fn mac_flags(&self, index: u16) -> Option<u16> {
        self.mac_table.lock().get(&index).map(|(_, flags)| *flags)
    }

    fn with_port<R>(&self, port: usize, f: impl FnOnce(&mut PortState) -> R) -> DsaResult<R> {
        check_port(port)?;
        let mut ports = self.ports.lock();
        Ok(f(ports.get_or_insert_with(port, PortState::default)))
    }
}

impl SwitchDriver for TailTagDriver {
    fn name(&self) -> &str {
        "tail-tag"
    }

    fn resolve_port(
        &self,
        ports: &PortMap<'_>,
        arriving: IfaceId,
        frame: &mut Frame,
    ) -> DsaResult<Option<IfaceId>> {
        let Some(tag) = frame.tail() else {
            return Ok(None);
        };
        let port = tag & TAIL_TAG_PORT_MASK;
        let Some(slave) = ports.slave(i64::from(port)) else {
            trace!("{}: tail tag {:#04x} names no slave", arriving, tag);
            return Ok(None);
        };
        frame.pop_tail();
        Ok(Some(slave))
    }

    fn inject_tag(&self, ports: &PortMap<'_>, iface: IfaceId, mut frame: Frame) -> DsaResult<Frame> {
        let tag = match ports.port_of(iface) {
            Some(port) => Self::port_tag(port)?,
            None if ports.master() == Some(iface) => TAIL_TAG_LOOKUP,
            None => {
                return Err(DsaError::invalid_argument(format!(
                    "{} is not a port of this switch",
                    iface
                )))
            }
        };
        frame.pad_to(ETH_MIN_LEN);
        frame.push_tail(tag);
        Ok(frame)
    }

    fn switch_read(&self, reg: u16) -> DsaResult<u8> {
        bus_status(reg).to_result()?;
        Ok(self.registers.lock().get(&reg).copied().unwrap_or(0))
    }

    fn switch_write(&self, reg: u16, value: u8) -> DsaResult<()> {
        bus_status(reg).to_result()?;
        trace!("tail-tag: reg {:#06x} <- {:#04x}", reg, value);
        self.registers.lock().insert(reg, value);
        Ok(())
    }

    fn mac_table_get(&self, index: u16) -> DsaResult<MacTableEntry> {
        check_mac_index(index)?;
        Ok(self
            .mac_table
            .lock()
            .get(&index)
            .map(|(entry, _)| *entry)
            .unwrap_or_default())
    }

    fn mac_table_set(&self, entry: &MacTableEntry, index: u16, flags: u16) -> DsaResult<()> {
        check_mac_index(index)?;
        check_port(usize::from(entry.fw_port))?;
        self.mac_table.lock().insert(index, (*entry, flags));
        Ok(())
    }

    fn port_enable(&self, port: usize, link: &PhyLinkState) -> DsaResult<()> {
        self.with_port(port, |state| {
            state.enabled = true;
            state.link = Some(*link);
        })
    }

    fn port_disable(&self, port: usize) -> DsaResult<()> {
        self.with_port(port, |state| {
            state.enabled = false;
            state.link = None;
        })
    }

    fn phylink_mac_link_up(&self, port: usize, config: &PhyLinkConfig) -> DsaResult<()> {
        self.with_port(port, |state| state.mac_link = Some(*config))
    }

    fn port_vlan_filtering(&self, port: usize, enable: bool) -> DsaResult<()> {
        self.with_port(port, |state| state.vlan_filtering = enable)
    }

    fn port_vlan_add(&self, port: usize, vid: VlanId, untagged: bool, pvid: bool) -> DsaResult<()> {
        self.with_port(port, |state| {
            if pvid {
                for membership in state.vlans.values_mut() {
                    membership.pvid = false;
                }
            }
            state.vlans.insert(vid, VlanMembership { untagged, pvid });
        })
    }

    fn port_vlan_del(&self, port: usize, vid: VlanId) -> DsaResult<()> {
        let removed = self.with_port(port, |state| state.vlans.remove(&vid).is_some())?;
        if !removed {
            return Err(DsaError::not_found(format!("{} on port {}", vid, port)));
        }
        Ok(())
    }

    fn lag_join(&self, port: usize, lag: LagAssignment) -> DsaResult<()> {
        check_port(port)?;
        debug!("tail-tag: port {} -> LAG {}", port, lag.id);
        self.lag_events.lock().push(LagEvent::Join { port, lag });
        Ok(())
    }

    fn lag_leave(&self, port: usize, lag: LagAssignment) -> DsaResult<()> {
        check_port(port)?;
        debug!("tail-tag: port {} left LAG {}", port, lag.id);
        self.lag_events.lock().push(LagEvent::Leave { port, lag });
        Ok(())
    }

    fn lag_change(&self, port: usize) -> DsaResult<()> {
        check_port(port)?;
        self.lag_events.lock().push(LagEvent::Change { port });
        Ok(())
    }
}
