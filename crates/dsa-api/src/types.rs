//! Type-safe handles and LAG records.
//!
//! Interface and switch handles share the same raw representation but are
//! distinct types, so an interface handle can never be passed where a switch
//! handle is expected.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Raw handle value as the host stack hands it out.
pub type RawHandle = u32;

/// Marker trait for handle kinds.
pub trait HandleKind: Send + Sync + 'static {
    /// Returns the handle kind name for debugging.
    fn type_name() -> &'static str;
}

/// A type-safe handle.
///
/// Raw value 0 is the null handle and is never handed out by registries.
///
/// # Examples
///
/// ```
/// use dsa_api::{IfaceId, SwitchId};
///
/// let iface = IfaceId::from_raw(1).unwrap();
/// let switch = SwitchId::from_raw(1).unwrap();
/// assert_eq!(iface.as_raw(), switch.as_raw());
/// assert!(IfaceId::from_raw(0).is_none());
/// ```
pub struct Handle<T: HandleKind> {
    raw: RawHandle,
    _marker: PhantomData<T>,
}

impl<T: HandleKind> Handle<T> {
    /// The null handle.
    pub const NULL: Self = Self {
        raw: 0,
        _marker: PhantomData,
    };

    /// Creates a handle from a raw value; `None` for the null value.
    pub fn from_raw(raw: RawHandle) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self::from_raw_unchecked(raw))
        }
    }

    /// Creates a handle from a raw value, including null.
    pub const fn from_raw_unchecked(raw: RawHandle) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// Returns the raw handle value.
    pub const fn as_raw(&self) -> RawHandle {
        self.raw
    }

    /// Returns true if this is the null handle.
    pub const fn is_null(&self) -> bool {
        self.raw == 0
    }
}

impl<T: HandleKind> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: HandleKind> Copy for Handle<T> {}

impl<T: HandleKind> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::type_name(), self.raw)
    }
}

impl<T: HandleKind> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", T::type_name().to_lowercase(), self.raw)
    }
}

impl<T: HandleKind> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: HandleKind> Eq for Handle<T> {}

impl<T: HandleKind> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: HandleKind> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T: HandleKind> Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

macro_rules! define_handle_kind {
    ($name:ident, $type_name:literal, $alias:ident) => {
        #[doc = concat!("Marker type for ", $type_name, " handles.")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl HandleKind for $name {
            fn type_name() -> &'static str {
                $type_name
            }
        }

        #[doc = concat!("Handle to a ", $type_name, ".")]
        pub type $alias = Handle<$name>;
    };
}

define_handle_kind!(IfaceKind, "Iface", IfaceId);
define_handle_kind!(SwitchKind, "Switch", SwitchId);

/// LAG group identifier. Zero is the "unused" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LagId(u32);

impl LagId {
    /// The sentinel stored in empty pool slots.
    pub const UNUSED: LagId = LagId(0);

    pub const fn new(id: u32) -> Self {
        LagId(id)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns true for the sentinel value.
    pub const fn is_unused(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for LagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LagId {
    fn from(id: u32) -> Self {
        LagId(id)
    }
}

/// LAG record of one port, as handed to the driver's LAG calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LagAssignment {
    pub id: LagId,
    pub valid: bool,
}

impl LagAssignment {
    /// The empty record.
    pub const EMPTY: LagAssignment = LagAssignment {
        id: LagId::UNUSED,
        valid: false,
    };

    /// A valid assignment to `id`.
    pub const fn assigned(id: LagId) -> Self {
        LagAssignment { id, valid: true }
    }

    /// Returns true if the record is valid and points at `id`.
    pub fn is_member_of(&self, id: LagId) -> bool {
        self.valid && self.id == id
    }
}

/// Read-only view of a switch's slave ports, lent to drivers.
///
/// Lookups by port number are bounds-checked: the number usually comes
/// straight out of a tag on the wire.
#[derive(Debug, Clone, Copy)]
pub struct PortMap<'a> {
    master: Option<IfaceId>,
    slaves: &'a [IfaceId],
}

impl<'a> PortMap<'a> {
    pub fn new(master: Option<IfaceId>, slaves: &'a [IfaceId]) -> Self {
        Self { master, slaves }
    }

    /// Returns the master interface, if registered.
    pub fn master(&self) -> Option<IfaceId> {
        self.master
    }

    /// Returns the slave at `port`, or `None` when out of range.
    pub fn slave(&self, port: i64) -> Option<IfaceId> {
        if port < 0 {
            return None;
        }
        usize::try_from(port)
            .ok()
            .and_then(|p| self.slaves.get(p))
            .copied()
    }

    /// Returns the port number of a slave interface.
    pub fn port_of(&self, iface: IfaceId) -> Option<usize> {
        self.slaves.iter().position(|s| *s == iface)
    }

    /// Number of slave ports.
    pub fn len(&self) -> usize {
        self.slaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slaves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_handle_creation() {
        let iface = IfaceId::from_raw(4).unwrap();
        assert_eq!(iface.as_raw(), 4);
        assert!(!iface.is_null());
        assert!(IfaceId::NULL.is_null());
        assert!(SwitchId::from_raw(0).is_none());
    }

    #[test]
    fn test_handle_formatting() {
        let iface = IfaceId::from_raw(2).unwrap();
        assert_eq!(format!("{:?}", iface), "Iface(2)");
        assert_eq!(iface.to_string(), "iface#2");
    }

    #[test]
    fn test_lag_assignment() {
        let lag = LagAssignment::assigned(LagId::new(10));
        assert!(lag.is_member_of(LagId::new(10)));
        assert!(!lag.is_member_of(LagId::new(11)));
        assert!(!LagAssignment::EMPTY.is_member_of(LagId::UNUSED));
    }

    #[test]
    fn test_port_map_bounds() {
        let slaves = [
            IfaceId::from_raw_unchecked(2),
            IfaceId::from_raw_unchecked(3),
        ];
        let map = PortMap::new(Some(IfaceId::from_raw_unchecked(1)), &slaves);
        assert_eq!(map.slave(0), Some(slaves[0]));
        assert_eq!(map.slave(1), Some(slaves[1]));
        assert_eq!(map.slave(2), None);
        assert_eq!(map.slave(-1), None);
        assert_eq!(map.port_of(slaves[1]), Some(1));
        assert_eq!(map.port_of(IfaceId::from_raw_unchecked(1)), None);
    }
}
