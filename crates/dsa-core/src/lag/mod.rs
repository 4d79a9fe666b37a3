//! LAG manager.
//!
//! Administrative join/leave/change on a switch's ports. The table is
//! updated under the switch's write lock and the driver is told afterwards,
//! still under that lock. A driver failure is returned as-is; the table
//! keeps the new state.

mod table;

pub use table::{LagSnapshot, LagTable, LagTableStats, PortLagView};

use dsa_api::{DsaResult, LagAssignment, LagId, SwitchId};
use log::{info, warn};

use crate::registry::Registry;

impl Registry {
    /// Puts `port` of `switch` into LAG `id`.
    pub fn lag_join(&self, switch: SwitchId, port: usize, id: LagId) -> DsaResult<()> {
        let sw = self.switch(switch)?;
        let mut sw = sw.write();
        let lag = sw.lag_mut().join(port, id).map_err(|e| {
            warn!("LAG join port {} group {} on {} rejected: {}", port, id, switch, e);
            e
        })?;
        info!("Port {} of {} joined LAG {}", port, switch, id);
        sw.driver().lag_join(port, lag)
    }

    /// Removes `port` of `switch` from LAG `id`.
    pub fn lag_leave(&self, switch: SwitchId, port: usize, id: LagId) -> DsaResult<()> {
        let sw = self.switch(switch)?;
        let mut sw = sw.write();
        let lag = sw.lag_mut().leave(port, id).map_err(|e| {
            warn!("LAG leave port {} group {} on {} rejected: {}", port, id, switch, e);
            e
        })?;
        info!("Port {} of {} left LAG {}", port, switch, id);
        sw.driver().lag_leave(port, lag)
    }

    /// Moves `port` of `switch` to the already active LAG `new_id`.
    ///
    /// Unlike a plain re-home, `new_id` is checked here: it must already
    /// hold a pool slot, otherwise the call fails with `NotSupported` and
    /// nothing changes. Change never claims a slot, so moving a port into a
    /// group that is not active would leave the pool out of step with the
    /// port records. Use [`Registry::lag_join`] to open a new group.
    pub fn lag_change(&self, switch: SwitchId, port: usize, new_id: LagId) -> DsaResult<()> {
        let sw = self.switch(switch)?;
        let mut sw = sw.write();
        let old = sw.lag_mut().change(port, new_id).map_err(|e| {
            warn!(
                "LAG change port {} to group {} on {} rejected: {}",
                port, new_id, switch, e
            );
            e
        })?;
        info!("Port {} of {} moved from LAG {} to {}", port, switch, old, new_id);
        sw.driver().lag_change(port)
    }

    pub fn lag_assignment(&self, switch: SwitchId, port: usize) -> DsaResult<LagAssignment> {
        self.switch(switch)?.read().lag().assignment(port)
    }

    pub fn lag_active_groups(&self, switch: SwitchId) -> DsaResult<Vec<LagId>> {
        Ok(self.switch(switch)?.read().lag().active_groups())
    }

    pub fn lag_members(&self, switch: SwitchId, id: LagId) -> DsaResult<Vec<usize>> {
        Ok(self.switch(switch)?.read().lag().members(id))
    }

    pub fn lag_snapshot(&self, switch: SwitchId) -> DsaResult<LagSnapshot> {
        Ok(self.switch(switch)?.read().lag().snapshot())
    }
}
