//! Per-interface context.

use std::sync::Arc;

use dsa_api::{LinkTransmit, RecvFilter, SwitchId};

/// What the registry remembers about one interface.
///
/// The DSA role is not stored here; it is classified from the link layer
/// on every query.
#[derive(Clone, Default)]
pub struct IfaceContext {
    /// Untagged transmit of a master, recorded before the egress hook
    /// replaced it.
    pub master_tx: Option<Arc<dyn LinkTransmit>>,
    pub recv_filter: Option<RecvFilter>,
    pub switch: Option<SwitchId>,
}

impl std::fmt::Debug for IfaceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IfaceContext")
            .field("has_master_tx", &self.master_tx.is_some())
            .field("has_recv_filter", &self.recv_filter.is_some())
            .field("switch", &self.switch)
            .finish()
    }
}
