//! Error types for KM device detection

use thiserror::Error;

/// Errors that can occur during detection
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),

    /// No port description matched and no port was given explicitly
    #[error("{device} serial device not found (looked for {markers}); specify one with --port")]
    DeviceNotFound { device: String, markers: String },
}
