//! KM Protocol Library
//!
//! This crate provides encoding and decoding for the line-framed ASCII
//! command protocol spoken by keyboard/mouse emulator microcontrollers.
//! The same device exposes two personalities:
//!
//! - **USB Composite (KM)**: native USB relative/absolute mouse and keyboard
//! - **PS/2 emulation**: electrical impersonation of a PS/2 mouse or keyboard
//!
//! # Frame Format
//!
//! Every frame is one ASCII line terminated by `\r\n` and takes one of
//! three shapes:
//!
//! - `#0xA1@USBcmd\r\n`: a bare opcode (mode switches, queries, reboot)
//! - `#0xD5@USBcmd:1920x1080\r\n`: opcode plus parameter
//! - `10,-5,1,0,0,1\r\n`: a bare parameter, interpreted by the device
//!   according to whatever mode a previous opcode selected
//!
//! The host never reads responses back. Mode is a property of the remote
//! device; nothing here tracks it.
//!
//! # Example
//!
//! ```rust
//! use km_protocol::{EncodeCommand, MouseReport, Operation, Personality};
//!
//! let op = Operation::MoveRelative(MouseReport::new(5, 5).with_right(true));
//! let frame = op.encode_frame(Personality::Ps2).unwrap();
//! assert_eq!(frame.encode(), b"5,5,0,1,0\r\n");
//! ```

pub mod error;
pub mod frame;
pub mod mode;
pub mod opcodes;
pub mod operation;
pub mod payload;
pub mod personality;

pub use error::{EncodingError, ParseError};
pub use frame::{Frame, FrameCodec};
pub use mode::{ControlSource, Ps2Activation, Ps2Mode, UsbMode};
pub use operation::{Operation, OperationKind};
pub use payload::{Buttons, MouseReport, Resolution};
pub use personality::{Descriptor, Personality, Shape, WheelField};

/// Trait for streaming decoders that split raw bytes into frames
pub trait ProtocolCodec {
    /// The item produced by this codec
    type Frame;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete frame from the buffer
    fn next_frame(&mut self) -> Option<Self::Frame>;

    /// Try to extract the next complete frame along with its raw bytes
    ///
    /// Used by the virtual device to keep an exact record of what arrived
    /// on the wire.
    fn next_frame_with_bytes(&mut self) -> Option<(Self::Frame, Vec<u8>)>;

    /// Clear the internal buffer
    fn clear(&mut self);
}

/// Trait for values that can be encoded to wire bytes
pub trait EncodeCommand {
    /// Encode this value to its wire format, terminator included
    fn encode(&self) -> Vec<u8>;
}

/// Encode an operation straight to wire bytes for the given personality
pub fn encode(personality: Personality, operation: &Operation) -> Result<Vec<u8>, EncodingError> {
    operation
        .encode_frame(personality)
        .map(|frame| frame.encode())
}
