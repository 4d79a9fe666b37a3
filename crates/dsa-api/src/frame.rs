//! Owned Ethernet frame buffer.

use dsa_types::MacAddress;

use crate::types::IfaceId;

/// Length of an untagged Ethernet header.
pub const ETH_HEADER_LEN: usize = 14;

/// Minimum Ethernet frame length without FCS.
pub const ETH_MIN_LEN: usize = 60;

/// An owned, mutable frame plus the interface that currently owns it.
///
/// Ownership moves with each routing decision: the receive hook updates
/// [`Frame::iface`] to the chosen interface, the transmit hook consumes the
/// frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    data: Vec<u8>,
    iface: Option<IfaceId>,
}

impl Frame {
    /// Creates a frame that no interface owns yet.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, iface: None }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the interface currently owning the frame.
    pub fn iface(&self) -> Option<IfaceId> {
        self.iface
    }

    pub fn set_iface(&mut self, iface: IfaceId) {
        self.iface = Some(iface);
    }

    /// Destination MAC, if the frame carries a full header.
    pub fn dst_mac(&self) -> Option<MacAddress> {
        if self.data.len() < ETH_HEADER_LEN {
            return None;
        }
        MacAddress::from_slice(&self.data[0..6])
    }

    /// Zero-pads the frame up to `min_len` bytes.
    pub fn pad_to(&mut self, min_len: usize) {
        if self.data.len() < min_len {
            self.data.resize(min_len, 0);
        }
    }

    /// Appends one trailing byte.
    pub fn push_tail(&mut self, byte: u8) {
        self.data.push(byte);
    }

    /// Removes and returns the trailing byte.
    pub fn pop_tail(&mut self) -> Option<u8> {
        self.data.pop()
    }

    /// Returns the trailing byte without removing it.
    pub fn tail(&self) -> Option<u8> {
        self.data.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Frame {
        let mut data = vec![0xff; 6];
        data.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x01]);
        data.extend_from_slice(&[0x08, 0x06]);
        data.extend_from_slice(&[0u8; 28]);
        Frame::new(data)
    }

    #[test]
    fn test_destination_mac() {
        let frame = sample();
        assert_eq!(frame.dst_mac(), Some(MacAddress::BROADCAST));
        assert_eq!(frame.iface(), None);
    }

    #[test]
    fn test_short_frame_has_no_header() {
        let frame = Frame::new(vec![1, 2, 3]);
        assert_eq!(frame.dst_mac(), None);
    }

    #[test]
    fn test_pad_and_tail() {
        let mut frame = sample();
        frame.pad_to(ETH_MIN_LEN);
        assert_eq!(frame.len(), ETH_MIN_LEN);
        frame.push_tail(0x04);
        assert_eq!(frame.tail(), Some(0x04));
        assert_eq!(frame.pop_tail(), Some(0x04));
        assert_eq!(frame.len(), ETH_MIN_LEN);
    }
}
