//! USB Vendor/Product IDs for serial bridges seen on emulator boards
//!
//! Detection itself matches on port descriptions; these IDs only label
//! ports in listings.

/// USB Vendor ID / Product ID pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbId {
    pub vid: u16,
    pub pid: u16,
}

impl UsbId {
    pub const fn new(vid: u16, pid: u16) -> Self {
        Self { vid, pid }
    }
}

/// WCH CH340/CH341 and the CH9329-style composite bridges
pub mod wch {
    use super::UsbId;

    pub const VID: u16 = 0x1A86;

    pub const CH340: UsbId = UsbId::new(VID, 0x7523);
    pub const CH341: UsbId = UsbId::new(VID, 0x5523);
    pub const CH343: UsbId = UsbId::new(VID, 0x55D3);

    pub const ALL_PIDS: &[u16] = &[0x7523, 0x5523, 0x55D3];
}

/// Silicon Labs CP210x
pub mod cp210x {
    pub const VID: u16 = 0x10C4;
}

/// FTDI
pub mod ftdi {
    pub const VID: u16 = 0x0403;
}

/// Check if a VID/PID belongs to a WCH bridge
pub fn is_wch_bridge(vid: u16, pid: u16) -> bool {
    vid == wch::VID && wch::ALL_PIDS.contains(&pid)
}

/// Get adapter type name from VID
pub fn adapter_name(vid: u16) -> Option<&'static str> {
    match vid {
        wch::VID => Some("WCH"),
        cp210x::VID => Some("CP210x"),
        ftdi::VID => Some("FTDI"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wch_bridge() {
        assert!(is_wch_bridge(wch::CH340.vid, wch::CH340.pid));
        assert!(!is_wch_bridge(ftdi::VID, 0x6001));
        assert_eq!(adapter_name(0x1A86), Some("WCH"));
        assert_eq!(adapter_name(0xFFFF), None);
    }
}
