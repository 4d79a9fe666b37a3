//! Static MAC table entries.

use dsa_types::MacAddress;

/// One static MAC table entry: frames to `mac` are forwarded to `fw_port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MacTableEntry {
    pub mac: MacAddress,
    pub fw_port: u8,
}

impl MacTableEntry {
    pub fn new(mac: MacAddress, fw_port: u8) -> Self {
        Self { mac, fw_port }
    }
}
