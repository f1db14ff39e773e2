//! Device-side operating modes
//!
//! The host never tracks these authoritatively; they exist so that tools
//! which model the firmware (the virtual device, diagnostics) share one
//! vocabulary.

/// USB composite input mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UsbMode {
    #[default]
    Idle,
    RelativeMouse,
    AbsoluteMouse,
    Keyboard,
}

impl UsbMode {
    /// Returns whether bare payloads are read as pointer reports
    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::RelativeMouse | Self::AbsoluteMouse)
    }
}

/// Which side drives the USB composite outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlSource {
    Local,
    Remote,
}

/// PS/2 device being impersonated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ps2Mode {
    Mouse,
    Keyboard,
}

/// Whether the PS/2 lines are driven by the emulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ps2Activation {
    /// Lines released, downstream host sees the real device (if any)
    #[default]
    Passthrough,
    /// Emulator owns the lines
    Simulating,
}
