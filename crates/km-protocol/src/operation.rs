//! Logical operations and their encoding
//!
//! An [`Operation`] is what the caller wants the device to do. Turning it
//! into a [`Frame`] requires a [`Personality`], which decides both the
//! opcode literal and, for movement, how many payload fields go out.

use std::fmt;

use crate::error::EncodingError;
use crate::frame::Frame;
use crate::payload::{MouseReport, Resolution};
use crate::personality::{Personality, Shape};

/// Fieldless discriminant of [`Operation`], used as the opcode table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperationKind {
    RelativeMouseMode,
    AbsoluteMouseMode,
    MouseMode,
    KeyboardMode,
    Idle,
    Exit,
    LocalControl,
    RemoteControl,
    SetResolution,
    FirmwareInfo,
    Status,
    DebugOn,
    DebugOff,
    Reboot,
    SimulationOn,
    SimulationOff,
    MoveRelative,
    MoveAbsolute,
    Text,
    Combo,
}

impl OperationKind {
    /// Returns a human-readable name for the operation
    pub fn name(&self) -> &'static str {
        match self {
            Self::RelativeMouseMode => "relative mouse mode",
            Self::AbsoluteMouseMode => "absolute mouse mode",
            Self::MouseMode => "mouse mode",
            Self::KeyboardMode => "keyboard mode",
            Self::Idle => "idle",
            Self::Exit => "exit",
            Self::LocalControl => "local control",
            Self::RemoteControl => "remote control",
            Self::SetResolution => "set resolution",
            Self::FirmwareInfo => "firmware info",
            Self::Status => "status",
            Self::DebugOn => "debug on",
            Self::DebugOff => "debug off",
            Self::Reboot => "reboot",
            Self::SimulationOn => "simulation on",
            Self::SimulationOff => "simulation off",
            Self::MoveRelative => "relative move",
            Self::MoveAbsolute => "absolute move",
            Self::Text => "text",
            Self::Combo => "key combo",
        }
    }

    /// Returns true for operations that switch the device's mode
    pub fn is_mode_switch(&self) -> bool {
        matches!(
            self,
            Self::RelativeMouseMode
                | Self::AbsoluteMouseMode
                | Self::MouseMode
                | Self::KeyboardMode
                | Self::Idle
                | Self::Exit
                | Self::SimulationOn
                | Self::SimulationOff
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A logical device operation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// USB: switch to relative (REL) mouse mode
    RelativeMouseMode,
    /// USB: switch to absolute (ABS) mouse mode
    AbsoluteMouseMode,
    /// PS/2: switch to mouse mode
    MouseMode,
    /// Switch to keyboard mode (both personalities)
    KeyboardMode,
    /// USB: return to idle
    Idle,
    /// PS/2: leave the current mode
    Exit,
    /// USB: hand control to the local input devices
    LocalControl,
    /// USB: hand control to this host
    RemoteControl,
    /// USB: set the screen size used by absolute mapping
    SetResolution(Resolution),
    /// USB: query firmware version
    FirmwareInfo,
    /// USB: query mode and control source
    Status,
    /// USB: toggle firmware debug logging
    Debug { enabled: bool },
    /// Soft-reset the microcontroller
    Reboot,
    /// PS/2: start driving the PS/2 lines
    SimulationOn,
    /// PS/2: release the PS/2 lines
    SimulationOff,
    /// Relative pointer report (USB REL mode, PS/2 mouse mode)
    MoveRelative(MouseReport),
    /// USB: absolute pointer report
    MoveAbsolute(MouseReport),
    /// Keyboard text, sent verbatim
    Text(String),
    /// Keyboard combo such as `CTRL+ALT+DEL`, sent verbatim
    Combo(String),
}

impl Operation {
    /// Opcode table key for this operation
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::RelativeMouseMode => OperationKind::RelativeMouseMode,
            Operation::AbsoluteMouseMode => OperationKind::AbsoluteMouseMode,
            Operation::MouseMode => OperationKind::MouseMode,
            Operation::KeyboardMode => OperationKind::KeyboardMode,
            Operation::Idle => OperationKind::Idle,
            Operation::Exit => OperationKind::Exit,
            Operation::LocalControl => OperationKind::LocalControl,
            Operation::RemoteControl => OperationKind::RemoteControl,
            Operation::SetResolution(_) => OperationKind::SetResolution,
            Operation::FirmwareInfo => OperationKind::FirmwareInfo,
            Operation::Status => OperationKind::Status,
            Operation::Debug { enabled: true } => OperationKind::DebugOn,
            Operation::Debug { enabled: false } => OperationKind::DebugOff,
            Operation::Reboot => OperationKind::Reboot,
            Operation::SimulationOn => OperationKind::SimulationOn,
            Operation::SimulationOff => OperationKind::SimulationOff,
            Operation::MoveRelative(_) => OperationKind::MoveRelative,
            Operation::MoveAbsolute(_) => OperationKind::MoveAbsolute,
            Operation::Text(_) => OperationKind::Text,
            Operation::Combo(_) => OperationKind::Combo,
        }
    }

    /// The parameter string this operation carries, if any
    pub fn parameter(&self, personality: Personality) -> Option<String> {
        match self {
            Operation::SetResolution(res) => Some(res.to_string()),
            Operation::MoveRelative(report) | Operation::MoveAbsolute(report) => {
                Some(report.to_fields(personality.wheel_field()))
            }
            Operation::Text(text) | Operation::Combo(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Build the wire frame for this operation
    pub fn encode_frame(&self, personality: Personality) -> Result<Frame, EncodingError> {
        let kind = self.kind();
        let shape = personality
            .shape(kind)
            .ok_or(EncodingError::Unsupported {
                operation: kind.name(),
                personality: personality.name(),
            })?;

        let frame = match shape {
            Shape::Opcode(opcode) => Frame::command(opcode)?,
            Shape::OpcodeWithParam(opcode) => {
                Frame::new(Some(opcode.to_string()), self.parameter(personality))?
            }
            Shape::Payload => Frame::new(None, self.parameter(personality))?,
        };

        tracing::trace!("encoded {} for {}: {}", kind, personality, frame);
        Ok(frame)
    }
}
