//! Fixed-capacity LAG group pool and per-port assignment table.
//!
//! The pool holds the group ids currently in use; slot value 0 means free.
//! A group is referenced when at least one port holds a valid assignment to
//! it. References are counted by scanning every port, never by counters, so
//! the pool can't drift from the port table:
//!
//! ```text
//! non-zero pool entries == distinct ids of valid port assignments
//! ```

use dsa_api::{DsaError, DsaResult, LagAssignment, LagId};
use serde::Serialize;

/// LAG operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LagTableStats {
    pub joins: u64,
    pub leaves: u64,
    pub changes: u64,
    /// Pool slots returned to the free state.
    pub reclaimed: u64,
}

/// Serializable view of one port's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortLagView {
    pub port: usize,
    pub group: Option<u32>,
}

/// Serializable view of a whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LagSnapshot {
    pub capacity: usize,
    /// Pool slots in order; 0 is free.
    pub pool: Vec<u32>,
    pub ports: Vec<PortLagView>,
    pub stats: LagTableStats,
}

/// Group pool plus assignment records, sized once and never resized.
#[derive(Debug, Clone)]
pub struct LagTable {
    ports: Vec<LagAssignment>,
    pool: Vec<LagId>,
    stats: LagTableStats,
}

impl LagTable {
    pub fn new(max_ports: usize, capacity: usize) -> Self {
        Self {
            ports: vec![LagAssignment::EMPTY; max_ports],
            pool: vec![LagId::UNUSED; capacity],
            stats: LagTableStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.pool.len()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn stats(&self) -> LagTableStats {
        self.stats
    }

    fn check_port(&self, port: usize) -> DsaResult<()> {
        if port >= self.ports.len() {
            return Err(DsaError::invalid_argument(format!(
                "port {} out of range (max {})",
                port,
                self.ports.len()
            )));
        }
        Ok(())
    }

    /// Returns the record of `port`.
    pub fn assignment(&self, port: usize) -> DsaResult<LagAssignment> {
        self.check_port(port)?;
        Ok(self.ports[port])
    }

    /// Group ids currently holding a pool slot, in slot order.
    pub fn active_groups(&self) -> Vec<LagId> {
        self.pool.iter().copied().filter(|id| !id.is_unused()).collect()
    }

    /// Ports holding a valid assignment to `id`.
    pub fn members(&self, id: LagId) -> Vec<usize> {
        self.ports
            .iter()
            .enumerate()
            .filter(|(_, lag)| lag.is_member_of(id))
            .map(|(port, _)| port)
            .collect()
    }

    fn is_referenced(&self, id: LagId) -> bool {
        self.ports.iter().any(|lag| lag.is_member_of(id))
    }

    fn reclaim_if_unreferenced(&mut self, id: LagId) -> bool {
        if id.is_unused() || self.is_referenced(id) {
            return false;
        }
        match self.pool.iter_mut().find(|slot| **slot == id) {
            Some(slot) => {
                *slot = LagId::UNUSED;
                self.stats.reclaimed += 1;
                true
            }
            None => false,
        }
    }

    /// Puts `port` into group `id`, claiming a pool slot if the group is new.
    ///
    /// A port already in another group leaves it first; that group's slot is
    /// reclaimed if nothing else references it. Returns the new record.
    pub fn join(&mut self, port: usize, id: LagId) -> DsaResult<LagAssignment> {
        self.check_port(port)?;
        if id.is_unused() {
            return Err(DsaError::invalid_argument("LAG id 0 is reserved"));
        }

        let slot = match self.pool.iter().position(|slot| *slot == id) {
            Some(slot) => slot,
            None => self
                .pool
                .iter()
                .position(|slot| slot.is_unused())
                .ok_or(DsaError::OutOfGroups {
                    capacity: self.pool.len(),
                })?,
        };
        self.pool[slot] = id;

        let previous = self.ports[port];
        let lag = LagAssignment::assigned(id);
        self.ports[port] = lag;
        if previous.valid && previous.id != id {
            self.reclaim_if_unreferenced(previous.id);
        }
        self.stats.joins += 1;
        Ok(lag)
    }

    /// Removes `port` from group `id`.
    ///
    /// Returns the invalidated record (`valid == false`, still naming `id`)
    /// for the driver.
    pub fn leave(&mut self, port: usize, id: LagId) -> DsaResult<LagAssignment> {
        self.check_port(port)?;
        if !self.ports[port].is_member_of(id) {
            return Err(DsaError::not_supported(format!(
                "port {} is not a member of LAG {}",
                port, id
            )));
        }

        self.ports[port] = LagAssignment::EMPTY;
        self.reclaim_if_unreferenced(id);
        self.stats.leaves += 1;
        Ok(LagAssignment { id, valid: false })
    }

    /// Moves `port` from its current group to `new_id`.
    ///
    /// `new_id` must already hold a pool slot; no slot is allocated here.
    /// Returns the group the port left.
    pub fn change(&mut self, port: usize, new_id: LagId) -> DsaResult<LagId> {
        self.check_port(port)?;
        let old = self.ports[port];
        if !old.valid {
            return Err(DsaError::not_supported(format!(
                "port {} has no LAG assignment",
                port
            )));
        }
        if new_id.is_unused() || !self.pool.contains(&new_id) {
            return Err(DsaError::not_supported(format!(
                "LAG {} is not active",
                new_id
            )));
        }

        self.ports[port].id = new_id;
        self.reclaim_if_unreferenced(old.id);
        self.stats.changes += 1;
        Ok(old.id)
    }

    pub fn snapshot(&self) -> LagSnapshot {
        LagSnapshot {
            capacity: self.pool.len(),
            pool: self.pool.iter().map(LagId::as_u32).collect(),
            ports: self
                .ports
                .iter()
                .enumerate()
                .map(|(port, lag)| PortLagView {
                    port,
                    group: lag.valid.then(|| lag.id.as_u32()),
                })
                .collect(),
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lag(id: u32) -> LagId {
        LagId::new(id)
    }

    /// Pool entries must match the distinct ids of valid records.
    fn assert_pool_consistent(table: &LagTable) {
        let mut active: Vec<u32> = table.active_groups().iter().map(LagId::as_u32).collect();
        active.sort_unstable();
        let mut referenced: Vec<u32> = (0..table.port_count())
            .filter_map(|p| {
                let rec = table.assignment(p).unwrap();
                rec.valid.then(|| rec.id.as_u32())
            })
            .collect();
        referenced.sort_unstable();
        referenced.dedup();
        assert_eq!(active, referenced);
    }

    #[test]
    fn test_shared_group_keeps_slot_until_last_leave() {
        let mut table = LagTable::new(4, 4);
        table.join(0, lag(10)).unwrap();
        table.join(1, lag(10)).unwrap();
        assert_eq!(table.active_groups(), vec![lag(10)]);
        assert_eq!(table.members(lag(10)), vec![0, 1]);

        let rec = table.leave(0, lag(10)).unwrap();
        assert_eq!(rec, LagAssignment { id: lag(10), valid: false });
        assert_eq!(table.active_groups(), vec![lag(10)]);

        table.leave(1, lag(10)).unwrap();
        assert!(table.active_groups().is_empty());
        assert_eq!(table.stats().reclaimed, 1);
        assert_pool_consistent(&table);
    }

    #[test]
    fn test_join_then_leave_restores_table() {
        let mut table = LagTable::new(4, 2);
        let before = table.snapshot();
        table.join(2, lag(7)).unwrap();
        table.leave(2, lag(7)).unwrap();
        let after = table.snapshot();
        assert_eq!(after.pool, before.pool);
        assert_eq!(after.ports, before.ports);
    }

    #[test]
    fn test_join_reuses_existing_slot() {
        let mut table = LagTable::new(4, 2);
        table.join(0, lag(5)).unwrap();
        table.join(1, lag(6)).unwrap();
        table.join(2, lag(5)).unwrap();
        assert_eq!(table.snapshot().pool, vec![5, 6]);
    }

    #[test]
    fn test_join_pool_exhausted() {
        let mut table = LagTable::new(4, 1);
        table.join(0, lag(1)).unwrap();
        assert_eq!(
            table.join(1, lag(2)),
            Err(DsaError::OutOfGroups { capacity: 1 })
        );
        assert_eq!(table.assignment(1).unwrap(), LagAssignment::EMPTY);
        assert_pool_consistent(&table);
    }

    #[test]
    fn test_join_rejects_reserved_id_and_bad_port() {
        let mut table = LagTable::new(2, 2);
        assert!(matches!(
            table.join(0, LagId::UNUSED),
            Err(DsaError::InvalidArgument { .. })
        ));
        assert!(matches!(
            table.join(2, lag(1)),
            Err(DsaError::InvalidArgument { .. })
        ));
        assert!(table.assignment(2).is_err());
    }

    #[test]
    fn test_rejoin_other_group_reclaims_old_slot() {
        let mut table = LagTable::new(4, 2);
        table.join(0, lag(1)).unwrap();
        table.join(0, lag(2)).unwrap();
        assert_eq!(table.active_groups(), vec![lag(2)]);
        assert_pool_consistent(&table);
    }

    #[test]
    fn test_leave_unassigned_port() {
        let mut table = LagTable::new(4, 4);
        for id in [0, 1, 99] {
            assert!(matches!(
                table.leave(3, lag(id)),
                Err(DsaError::NotSupported { .. })
            ));
        }
    }

    #[test]
    fn test_leave_wrong_group() {
        let mut table = LagTable::new(4, 4);
        table.join(0, lag(1)).unwrap();
        assert!(table.leave(0, lag(2)).is_err());
        assert_eq!(table.assignment(0).unwrap(), LagAssignment::assigned(lag(1)));
    }

    #[test]
    fn test_change_moves_port_and_reclaims_old() {
        let mut table = LagTable::new(4, 4);
        table.join(0, lag(1)).unwrap();
        table.join(1, lag(2)).unwrap();
        assert_eq!(table.change(0, lag(2)), Ok(lag(1)));
        assert_eq!(table.members(lag(2)), vec![0, 1]);
        assert_eq!(table.active_groups(), vec![lag(2)]);
        assert_eq!(table.stats().changes, 1);
        assert_pool_consistent(&table);
    }

    #[test]
    fn test_change_keeps_shared_old_group() {
        let mut table = LagTable::new(4, 4);
        table.join(0, lag(1)).unwrap();
        table.join(1, lag(1)).unwrap();
        table.join(2, lag(2)).unwrap();
        table.change(0, lag(2)).unwrap();
        assert_eq!(table.active_groups(), vec![lag(1), lag(2)]);
        assert_pool_consistent(&table);
    }

    #[test]
    fn test_change_unassigned_port() {
        let mut table = LagTable::new(4, 4);
        table.join(1, lag(3)).unwrap();
        assert!(matches!(
            table.change(0, lag(3)),
            Err(DsaError::NotSupported { .. })
        ));
    }

    #[test]
    fn test_change_to_inactive_group_is_rejected() {
        let mut table = LagTable::new(4, 4);
        table.join(0, lag(1)).unwrap();
        assert!(table.change(0, lag(9)).is_err());
        assert!(table.change(0, LagId::UNUSED).is_err());
        assert_eq!(table.assignment(0).unwrap(), LagAssignment::assigned(lag(1)));
        assert_eq!(table.stats().changes, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut table = LagTable::new(2, 2);
        table.join(1, lag(4)).unwrap();
        let json = serde_json::to_value(table.snapshot()).unwrap();
        assert_eq!(json["pool"], serde_json::json!([4, 0]));
        assert_eq!(json["ports"][0]["group"], serde_json::Value::Null);
        assert_eq!(json["ports"][1]["group"], 4);
        assert_eq!(json["stats"]["joins"], 1);
    }
}
