//! PHY link parameters for switch ports.

use dsa_types::{Duplex, LinkSpeed, PhyLinkMode};

/// Link state handed to a driver when a port is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhyLinkState {
    pub is_up: bool,
    pub speed: LinkSpeed,
    pub duplex: Duplex,
}

impl Default for PhyLinkState {
    /// Link up, 1000BASE-T full duplex.
    fn default() -> Self {
        Self {
            is_up: true,
            speed: LinkSpeed::GBPS_1,
            duplex: Duplex::Full,
        }
    }
}

/// MAC-side link parameters once the PHY reports link up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhyLinkConfig {
    pub mode: PhyLinkMode,
    pub speed: LinkSpeed,
    pub duplex: Duplex,
    pub tx_pause: bool,
    pub rx_pause: bool,
}

impl Default for PhyLinkConfig {
    fn default() -> Self {
        Self {
            mode: PhyLinkMode::Phy,
            speed: LinkSpeed::GBPS_1,
            duplex: Duplex::Full,
            tx_pause: false,
            rx_pause: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_defaults() {
        let state = PhyLinkState::default();
        assert!(state.is_up);
        assert_eq!(state.speed, LinkSpeed::GBPS_1);
        assert_eq!(state.duplex, Duplex::Full);
    }
}
