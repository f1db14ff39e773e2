//! Transport personalities and their opcode tables
//!
//! A [`Personality`] selects a static [`Descriptor`]: the table mapping each
//! supported operation to its frame shape, the wheel-field policy for
//! movement payloads, and the default pause the host leaves after each
//! frame.

use std::fmt;
use std::time::Duration;

use crate::opcodes::{ps2, usb};
use crate::operation::OperationKind;

/// Which firmware personality the device is driven through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Personality {
    /// Native USB composite keyboard/mouse
    UsbComposite,
    /// PS/2 electrical emulation
    Ps2,
}

/// How an operation is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `opcode\r\n`
    Opcode(&'static str),
    /// `opcode:param\r\n`
    OpcodeWithParam(&'static str),
    /// `param\r\n`, interpreted by the device's current mode
    Payload,
}

impl Shape {
    /// The opcode literal, if this shape carries one
    pub fn opcode(&self) -> Option<&'static str> {
        match self {
            Shape::Opcode(op) | Shape::OpcodeWithParam(op) => Some(op),
            Shape::Payload => None,
        }
    }
}

/// Whether movement payloads carry the trailing wheel field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WheelField {
    /// Always six fields; an unset wheel is sent as `0`
    Always,
    /// Five fields unless a wheel delta was given
    WhenSet,
}

/// Static description of a personality
#[derive(Debug)]
pub struct Descriptor {
    /// Human-readable name
    pub name: &'static str,
    /// Supported operations and their wire shapes
    pub table: &'static [(OperationKind, Shape)],
    /// Movement payload field-count policy
    pub wheel_field: WheelField,
    /// Default pause after each frame
    pub inter_command_delay: Duration,
}

static USB_COMPOSITE: Descriptor = Descriptor {
    name: "USB composite",
    table: &[
        (OperationKind::RelativeMouseMode, Shape::Opcode(usb::RELATIVE_MOUSE_MODE)),
        (OperationKind::AbsoluteMouseMode, Shape::Opcode(usb::ABSOLUTE_MOUSE_MODE)),
        (OperationKind::KeyboardMode, Shape::Opcode(usb::KEYBOARD_MODE)),
        (OperationKind::Idle, Shape::Opcode(usb::IDLE)),
        (OperationKind::LocalControl, Shape::Opcode(usb::LOCAL_CONTROL)),
        (OperationKind::RemoteControl, Shape::Opcode(usb::REMOTE_CONTROL)),
        (OperationKind::SetResolution, Shape::OpcodeWithParam(usb::SET_RESOLUTION)),
        (OperationKind::FirmwareInfo, Shape::Opcode(usb::FIRMWARE_INFO)),
        (OperationKind::Status, Shape::Opcode(usb::STATUS)),
        (OperationKind::DebugOn, Shape::Opcode(usb::DEBUG_ON)),
        (OperationKind::DebugOff, Shape::Opcode(usb::DEBUG_OFF)),
        (OperationKind::Reboot, Shape::Opcode(usb::REBOOT)),
        (OperationKind::MoveRelative, Shape::Payload),
        (OperationKind::MoveAbsolute, Shape::Payload),
        (OperationKind::Text, Shape::Payload),
        (OperationKind::Combo, Shape::Payload),
    ],
    wheel_field: WheelField::Always,
    inter_command_delay: Duration::from_millis(50),
};

// The PS/2 firmware has always been driven back-to-back; see DESIGN.md.
static PS2: Descriptor = Descriptor {
    name: "PS/2",
    table: &[
        (OperationKind::SimulationOn, Shape::Opcode(ps2::SIMULATION_ON)),
        (OperationKind::SimulationOff, Shape::Opcode(ps2::SIMULATION_OFF)),
        (OperationKind::MouseMode, Shape::Opcode(ps2::MOUSE_MODE)),
        (OperationKind::KeyboardMode, Shape::Opcode(ps2::KEYBOARD_MODE)),
        (OperationKind::Exit, Shape::Opcode(ps2::EXIT)),
        (OperationKind::Reboot, Shape::Opcode(ps2::REBOOT)),
        (OperationKind::MoveRelative, Shape::Payload),
        (OperationKind::Text, Shape::Payload),
        (OperationKind::Combo, Shape::Payload),
    ],
    wheel_field: WheelField::WhenSet,
    inter_command_delay: Duration::ZERO,
};

impl Personality {
    /// Every personality, in display order
    pub const ALL: [Personality; 2] = [Personality::UsbComposite, Personality::Ps2];

    /// The static descriptor for this personality
    pub fn descriptor(&self) -> &'static Descriptor {
        match self {
            Personality::UsbComposite => &USB_COMPOSITE,
            Personality::Ps2 => &PS2,
        }
    }

    /// Returns a human-readable name for the personality
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Wire shape of an operation, or `None` if this personality lacks it
    pub fn shape(&self, kind: OperationKind) -> Option<Shape> {
        self.descriptor()
            .table
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, shape)| *shape)
    }

    /// Returns whether the operation exists in this personality's table
    pub fn supports(&self, kind: OperationKind) -> bool {
        self.shape(kind).is_some()
    }

    /// Reverse lookup from an opcode literal to the operation it encodes
    pub fn operation_for_opcode(&self, opcode: &str) -> Option<OperationKind> {
        self.descriptor()
            .table
            .iter()
            .find(|(_, shape)| shape.opcode() == Some(opcode))
            .map(|(kind, _)| *kind)
    }

    /// Movement payload field-count policy
    pub fn wheel_field(&self) -> WheelField {
        self.descriptor().wheel_field
    }

    /// Default pause after each frame
    pub fn inter_command_delay(&self) -> Duration {
        self.descriptor().inter_command_delay
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
