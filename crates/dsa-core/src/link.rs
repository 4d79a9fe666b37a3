//! Host link-layer boundary.
//!
//! The registry never stores an interface's DSA role. It asks the host stack
//! for the link kind and capability flags each time and classifies from
//! those, so a capability change is visible on the very next frame.

use std::sync::atomic::{AtomicU32, Ordering};

use dsa_api::{DsaError, DsaResult, IfaceId};
use dsa_types::{EthCapabilities, LinkKind, PortClass};
use log::debug;
use parking_lot::RwLock;

use crate::sync_map::SyncMap;

/// What the DSA core needs to know about a host interface.
pub trait LinkLayer: Send + Sync {
    /// Link-layer binding, or `None` for an interface the host doesn't know.
    fn link_kind(&self, iface: IfaceId) -> Option<LinkKind>;

    /// Capability flags currently reported by the interface.
    fn capabilities(&self, iface: IfaceId) -> EthCapabilities;

    /// Interface name, for logs and the CLI.
    fn name(&self, iface: IfaceId) -> Option<String>;
}

#[derive(Debug, Clone)]
struct IfaceEntry {
    name: String,
    kind: LinkKind,
    caps: EthCapabilities,
}

/// In-memory link layer.
///
/// Handles are allocated from 1 upward; 0 stays the null handle.
#[derive(Debug)]
pub struct IfaceTable {
    entries: RwLock<SyncMap<IfaceId, IfaceEntry>>,
    next_id: AtomicU32,
}

impl IfaceTable {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(SyncMap::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Adds an interface and returns its handle.
    pub fn add(&self, name: impl Into<String>, kind: LinkKind, caps: EthCapabilities) -> IfaceId {
        let id = IfaceId::from_raw_unchecked(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = IfaceEntry {
            name: name.into(),
            kind,
            caps,
        };
        debug!("Added {} {} ({:?}, {:?})", id, entry.name, kind, caps);
        self.entries.write().insert(id, entry);
        id
    }

    /// Adds an Ethernet interface carrying the role flags for `class`.
    pub fn add_ethernet(&self, name: impl Into<String>, class: PortClass) -> IfaceId {
        let caps = match class {
            PortClass::Master => EthCapabilities::DSA_MASTER_PORT,
            PortClass::Slave => EthCapabilities::DSA_SLAVE_PORT,
            PortClass::Plain => EthCapabilities::empty(),
        };
        self.add(name, LinkKind::Ethernet, caps | EthCapabilities::LINK_1000BASE_T)
    }

    /// Replaces the capability flags of an interface.
    pub fn set_capabilities(&self, iface: IfaceId, caps: EthCapabilities) -> DsaResult<()> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(&iface)
            .ok_or_else(|| DsaError::not_found(format!("interface {}", iface)))?;
        debug!("{} capabilities {:?} -> {:?}", entry.name, entry.caps, caps);
        entry.caps = caps;
        Ok(())
    }

    /// Looks an interface up by name.
    pub fn by_name(&self, name: &str) -> Option<IfaceId> {
        self.entries
            .read()
            .iter()
            .find(|(_, entry)| entry.name == name)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for IfaceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkLayer for IfaceTable {
    fn link_kind(&self, iface: IfaceId) -> Option<LinkKind> {
        self.entries.read().get(&iface).map(|e| e.kind)
    }

    fn capabilities(&self, iface: IfaceId) -> EthCapabilities {
        self.entries
            .read()
            .get(&iface)
            .map(|e| e.caps)
            .unwrap_or_default()
    }

    fn name(&self, iface: IfaceId) -> Option<String> {
        self.entries.read().get(&iface).map(|e| e.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_handles_start_at_one() {
        let table = IfaceTable::new();
        let eth0 = table.add_ethernet("eth0", PortClass::Master);
        let lan1 = table.add_ethernet("lan1", PortClass::Slave);
        assert_eq!(eth0.as_raw(), 1);
        assert_eq!(lan1.as_raw(), 2);
        assert_eq!(table.by_name("lan1"), Some(lan1));
        assert_eq!(table.name(eth0).as_deref(), Some("eth0"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unknown_iface() {
        let table = IfaceTable::new();
        let ghost = IfaceId::from_raw_unchecked(42);
        assert_eq!(table.link_kind(ghost), None);
        assert_eq!(table.capabilities(ghost), EthCapabilities::empty());
        assert!(table.set_capabilities(ghost, EthCapabilities::HW_VLAN).is_err());
    }

    #[test]
    fn test_capabilities_are_mutable() {
        let table = IfaceTable::new();
        let lo = table.add("lo", LinkKind::Loopback, EthCapabilities::empty());
        table
            .set_capabilities(lo, EthCapabilities::DSA_SLAVE_PORT)
            .unwrap();
        assert_eq!(table.capabilities(lo), EthCapabilities::DSA_SLAVE_PORT);
        assert_eq!(table.link_kind(lo), Some(LinkKind::Loopback));
    }
}
