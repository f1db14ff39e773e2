//! KM Serial Port Detection Library
//!
//! This crate enumerates serial ports and picks the one an emulator device
//! is attached to, by matching the port's description against known
//! USB-serial bridge names.
//!
//! # Example
//!
//! ```rust,no_run
//! use km_detect::{Locator, PortScanner};
//!
//! let locator = Locator::new("USB composite KM");
//! let port = locator.resolve(None, &PortScanner::new()).unwrap();
//! println!("Using {}", port);
//! ```

pub mod error;
pub mod locator;
pub mod scanner;
pub mod usb_ids;

pub use error::DetectError;
pub use locator::{Locator, DEVICE_MARKERS};
pub use scanner::{PortScanner, PortSource, ScannerConfig, SerialPortInfo};
