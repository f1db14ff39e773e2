//! Wire frames
//!
//! A frame is one `\r\n`-terminated ASCII line made of an optional opcode
//! and an optional parameter:
//!
//! | opcode | param | wire            |
//! |--------|-------|-----------------|
//! | yes    | yes   | `opcode:param`  |
//! | yes    | no    | `opcode`        |
//! | no     | yes   | `param`         |
//! | no     | no    | rejected        |
//!
//! [`FrameCodec`] goes the other way, splitting a byte stream back into
//! frames. Opcodes always start with `#`, which is how a decoded line is
//! told apart from a bare payload.

use std::fmt;

use crate::error::EncodingError;
use crate::{EncodeCommand, ProtocolCodec};

/// Line terminator appended to every frame
pub const TERMINATOR: &str = "\r\n";

/// Separator between opcode and parameter
pub const PARAM_SEPARATOR: char = ':';

/// First character of every opcode literal
pub const OPCODE_PREFIX: char = '#';

/// Maximum line length the decoder will buffer
const MAX_FRAME_LEN: usize = 256;

/// A single protocol frame
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    opcode: Option<String>,
    param: Option<String>,
}

impl Frame {
    /// Build a frame from its parts
    ///
    /// Empty strings count as absent. Fails if both parts are absent or if
    /// either part contains a line terminator.
    pub fn new(opcode: Option<String>, param: Option<String>) -> Result<Self, EncodingError> {
        let opcode = opcode.filter(|s| !s.is_empty());
        let param = param.filter(|s| !s.is_empty());

        for field in opcode.iter().chain(param.iter()) {
            if field.contains(['\r', '\n']) {
                return Err(EncodingError::EmbeddedTerminator(field.clone()));
            }
        }

        if opcode.is_none() && param.is_none() {
            return Err(EncodingError::EmptyFrame);
        }

        Ok(Self { opcode, param })
    }

    /// Bare opcode frame
    pub fn command(opcode: impl Into<String>) -> Result<Self, EncodingError> {
        Self::new(Some(opcode.into()), None)
    }

    /// Opcode with parameter
    pub fn with_param(
        opcode: impl Into<String>,
        param: impl Into<String>,
    ) -> Result<Self, EncodingError> {
        Self::new(Some(opcode.into()), Some(param.into()))
    }

    /// Bare parameter frame
    pub fn payload(param: impl Into<String>) -> Result<Self, EncodingError> {
        Self::new(None, Some(param.into()))
    }

    /// Decode one line (terminator already stripped)
    ///
    /// Returns `None` for blank lines.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (opcode, param) = if line.starts_with(OPCODE_PREFIX) {
            match line.split_once(PARAM_SEPARATOR) {
                Some((opcode, param)) => (Some(opcode.to_string()), Some(param.to_string())),
                None => (Some(line.to_string()), None),
            }
        } else {
            (None, Some(line.to_string()))
        };
        Self::new(opcode, param).ok()
    }

    pub fn opcode(&self) -> Option<&str> {
        self.opcode.as_deref()
    }

    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    /// The full wire line, terminator included
    pub fn to_line(&self) -> String {
        format!("{}{}", self, TERMINATOR)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.opcode, &self.param) {
            (Some(op), Some(param)) => write!(f, "{}{}{}", op, PARAM_SEPARATOR, param),
            (Some(op), None) => f.write_str(op),
            (None, Some(param)) => f.write_str(param),
            // Unreachable through the constructors
            (None, None) => Ok(()),
        }
    }
}

impl EncodeCommand for Frame {
    fn encode(&self) -> Vec<u8> {
        self.to_line().into_bytes()
    }
}

/// Streaming line decoder
///
/// Accepts `\r\n` or a bare `\n` as terminator and skips blank lines.
#[derive(Debug)]
pub struct FrameCodec {
    buffer: Vec<u8>,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
        }
    }

    /// Bytes received but not yet terminated
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for FrameCodec {
    type Frame = Frame;

    fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // An unterminated line this long is noise; keep only the tail
        if !self.buffer.contains(&b'\n') && self.buffer.len() > MAX_FRAME_LEN {
            tracing::warn!(
                "Discarding {} unterminated bytes",
                self.buffer.len() - MAX_FRAME_LEN
            );
            let start = self.buffer.len() - MAX_FRAME_LEN;
            self.buffer = self.buffer[start..].to_vec();
        }
    }

    fn next_frame(&mut self) -> Option<Self::Frame> {
        self.next_frame_with_bytes().map(|(frame, _)| frame)
    }

    fn next_frame_with_bytes(&mut self) -> Option<(Self::Frame, Vec<u8>)> {
        loop {
            let term_pos = self.buffer.iter().position(|&b| b == b'\n')?;
            let line_bytes: Vec<u8> = self.buffer.drain(..=term_pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);

            match Frame::from_line(&line) {
                Some(frame) => return Some((frame, line_bytes)),
                None => tracing::trace!("Skipping blank line"),
            }
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}
