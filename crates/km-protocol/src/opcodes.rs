//! Opcode literals for each personality
//!
//! These strings are the wire contract with the firmware and must be sent
//! byte-for-byte. Both personalities share the `#0xZ26` idle/exit and
//! reboot opcodes.

/// USB composite (KM) opcodes
pub mod usb {
    pub const RELATIVE_MOUSE_MODE: &str = "#0xA1@USBcmd";
    pub const ABSOLUTE_MOUSE_MODE: &str = "#0xA2@USBcmd";
    pub const KEYBOARD_MODE: &str = "#0xB2@USBcmd";
    pub const LOCAL_CONTROL: &str = "#0xC3@USBcmd01";
    pub const REMOTE_CONTROL: &str = "#0xC3@USBcmd10";
    /// Takes a `WIDTHxHEIGHT` parameter
    pub const SET_RESOLUTION: &str = "#0xD5@USBcmd";
    pub const FIRMWARE_INFO: &str = "#0xW23@FH";
    pub const STATUS: &str = "#0xX24@GET";
    pub const DEBUG_OFF: &str = "#0xY25@DEG0";
    pub const DEBUG_ON: &str = "#0xY25@DEG1";
    pub const IDLE: &str = "#0xZ26@CMD";
    pub const REBOOT: &str = "#0xZ26@RET";
}

/// PS/2 emulation opcodes
pub mod ps2 {
    pub const SIMULATION_ON: &str = "#0xC3@PS2cmd10";
    pub const SIMULATION_OFF: &str = "#0xC3@PS2cmd01";
    pub const MOUSE_MODE: &str = "#0xA1@PS2cmd";
    pub const KEYBOARD_MODE: &str = "#0xB2@PS2cmd";
    pub const EXIT: &str = "#0xZ26@CMD";
    pub const REBOOT: &str = "#0xZ26@RET";
}
