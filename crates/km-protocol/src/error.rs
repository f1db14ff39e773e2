//! Error types for KM frame encoding and decoding

use thiserror::Error;

/// Errors raised while building a frame, before any byte is written
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// Neither an opcode nor a parameter was supplied
    #[error("empty frame: neither opcode nor parameter present")]
    EmptyFrame,

    /// The operation has no entry in the personality's opcode table
    #[error("{operation} is not supported in {personality} mode")]
    Unsupported {
        operation: &'static str,
        personality: &'static str,
    },

    /// A frame field contains CR or LF and would split the line
    #[error("frame field contains a line terminator: {0:?}")]
    EmbeddedTerminator(String),
}

/// Errors raised while decoding frames or payloads
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Movement payload did not have 5 or 6 numeric fields
    #[error("invalid movement payload: {0}")]
    InvalidMovement(String),

    /// Button field was not `0` or `1`
    #[error("invalid button flag: {0}")]
    InvalidButton(String),

    /// Resolution was not `WIDTHxHEIGHT`
    #[error("invalid resolution: {0}")]
    InvalidResolution(String),
}
