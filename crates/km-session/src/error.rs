//! Error types for serial sessions

use km_detect::DetectError;
use km_protocol::EncodingError;
use thiserror::Error;

/// Errors that can occur while opening or using a session
///
/// None of these are retried; each one ends the invocation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Port could not be resolved (device not found, enumeration failed)
    #[error(transparent)]
    Detect(#[from] DetectError),

    /// The OS refused to open the port (busy, missing, permission)
    #[error("failed to open port {port}: {source}")]
    PortOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Write or flush failed
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The operation could not be framed
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Send attempted after close
    #[error("session is closed")]
    Closed,
}

impl SessionError {
    /// Returns true if the device could not be located
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, SessionError::Detect(DetectError::DeviceNotFound { .. }))
    }
}
