//! Serial session to an emulator device

use std::io::Write;
use std::thread;
use std::time::Duration;

use km_detect::{Locator, PortScanner, PortSource};
use km_protocol::{EncodeCommand, Frame, Operation, Personality};
use serialport::SerialPort;
use tracing::{debug, info, trace, warn};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::opener::{PortOpener, SerialOpener};

/// An open connection to one device
pub struct Session<P: Write = Box<dyn SerialPort>> {
    /// Resolved port name
    port_name: String,
    /// Personality used by [`Session::execute`]
    personality: Personality,
    /// Pause after each frame
    inter_command_delay: Duration,
    /// Open port; `None` once closed
    port: Option<P>,
    /// Frames written so far
    frames_sent: usize,
}

impl Session {
    /// Open a session on a real serial port
    ///
    /// Auto-detects the port unless `config.port` is set.
    pub fn open(config: &SessionConfig) -> Result<Self, SessionError> {
        Self::open_with(config, &PortScanner::new(), &SerialOpener)
    }
}

impl<P: Write> Session<P> {
    /// Open a session with explicit port enumeration and opening strategies
    pub fn open_with<S, O>(config: &SessionConfig, ports: &S, opener: &O) -> Result<Self, SessionError>
    where
        S: PortSource + ?Sized,
        O: PortOpener<Port = P>,
    {
        let locator = Locator::new(config.personality.name());
        let port_name = locator.resolve(config.port.as_deref(), ports)?;

        info!(
            "Opening {} at {} baud ({})",
            port_name, config.baud_rate, config.personality
        );
        let port = opener
            .open(&port_name, config.baud_rate, config.read_timeout)
            .map_err(|source| SessionError::PortOpen {
                port: port_name.clone(),
                source,
            })?;

        if !config.settle_delay.is_zero() {
            trace!("Settling for {:?}", config.settle_delay);
            thread::sleep(config.settle_delay);
        }

        Ok(Self::from_port(port_name, port, config))
    }

    /// Wrap an already-open port, skipping resolution and settling
    pub fn from_port(port_name: impl Into<String>, port: P, config: &SessionConfig) -> Self {
        Self {
            port_name: port_name.into(),
            personality: config.personality,
            inter_command_delay: config.effective_inter_command_delay(),
            port: Some(port),
            frames_sent: 0,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Number of successful sends since opening
    pub fn frames_sent(&self) -> usize {
        self.frames_sent
    }

    /// Write raw bytes, then pause for the inter-command delay
    ///
    /// Success means the OS accepted the bytes; nothing is read back.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let port = self.port.as_mut().ok_or(SessionError::Closed)?;

        port.write_all(bytes)?;
        port.flush()?;
        self.frames_sent += 1;
        trace!("Wrote {} bytes to {}", bytes.len(), self.port_name);

        if !self.inter_command_delay.is_zero() {
            thread::sleep(self.inter_command_delay);
        }
        Ok(())
    }

    /// Send an already-built frame
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), SessionError> {
        debug!("-> {}", frame);
        self.send(&frame.encode())
    }

    /// Encode an operation with this session's personality and send it
    pub fn execute(&mut self, operation: &Operation) -> Result<(), SessionError> {
        let frame = operation.encode_frame(self.personality)?;
        trace!("{} as {}", operation.kind(), self.personality);
        self.send_frame(&frame)
    }

    /// Execute operations in order, stopping at the first failure
    pub fn execute_all<'a, I>(&mut self, operations: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = &'a Operation>,
    {
        for operation in operations {
            self.execute(operation)?;
        }
        Ok(())
    }

    /// Release the port. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush() {
                warn!("Flush on close of {} failed: {}", self.port_name, e);
            }
            info!(
                "Closed {} after {} frame(s)",
                self.port_name, self.frames_sent
            );
        }
    }
}

impl<P: Write> Drop for Session<P> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<P: Write> std::fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("port_name", &self.port_name)
            .field("personality", &self.personality)
            .field("open", &self.is_open())
            .field("frames_sent", &self.frames_sent)
            .finish()
    }
}
