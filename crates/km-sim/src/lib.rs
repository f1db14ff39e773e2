//! KM Device Simulation Library
//!
//! This crate provides a virtual emulator device for exercising the host
//! side without hardware. The [`VirtualDevice`] accepts bytes through
//! [`std::io::Write`], decodes frames, and applies them to a model of the
//! firmware's mode state machine.
//!
//! # Example
//!
//! ```rust
//! use std::io::Write;
//! use km_protocol::{Personality, Ps2Mode};
//! use km_sim::VirtualDevice;
//!
//! let mut device = VirtualDevice::new("bench", Personality::Ps2);
//! device.write_all(b"#0xC3@PS2cmd10\r\n#0xA1@PS2cmd\r\n").unwrap();
//!
//! assert_eq!(device.state().ps2_mode, Some(Ps2Mode::Mouse));
//! ```

pub mod device;

pub use device::{DeviceEvent, DeviceState, SharedDevice, VirtualDevice};
