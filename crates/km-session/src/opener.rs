//! Port opening
//!
//! [`PortOpener`] is the seam between a session and the OS. The default
//! [`SerialOpener`] opens a real port through the serialport crate; tests
//! substitute a virtual device.

use std::io::Write;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

/// Opens a named port for writing
pub trait PortOpener {
    /// The open port handle
    type Port: Write;

    /// Open `port` at `baud_rate` with the given read timeout
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Self::Port, serialport::Error>;
}

/// Opens OS serial ports, 8N1 without flow control
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialOpener;

impl PortOpener for SerialOpener {
    type Port = Box<dyn SerialPort>;

    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Self::Port, serialport::Error> {
        serialport::new(port, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
    }
}
