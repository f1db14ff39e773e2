//! Endpoint locator
//!
//! Chooses which serial port to talk to. An explicit port always wins and
//! is returned untouched; otherwise the first enumerated port whose
//! description contains one of the device markers is used.

use tracing::{debug, info};

use crate::error::DetectError;
use crate::scanner::{PortSource, SerialPortInfo};

/// Description substrings of the USB-serial bridges the emulator ships with
///
/// Matching is case-sensitive and exact.
pub const DEVICE_MARKERS: &[&str] = &["USB-SERIAL CH340", "WCH"];

/// Picks the serial port for a device
#[derive(Debug, Clone)]
pub struct Locator {
    device: String,
    markers: Vec<String>,
}

impl Locator {
    /// Locator for the named device, matching [`DEVICE_MARKERS`]
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            markers: DEVICE_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Replace the description markers
    pub fn with_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Returns whether the port's description contains a marker
    pub fn matches(&self, info: &SerialPortInfo) -> bool {
        let description = info.description();
        self.markers
            .iter()
            .any(|marker| description.contains(marker.as_str()))
    }

    /// Resolve the port to open
    ///
    /// The source is not consulted when `explicit` is given.
    pub fn resolve<S>(&self, explicit: Option<&str>, source: &S) -> Result<String, DetectError>
    where
        S: PortSource + ?Sized,
    {
        if let Some(port) = explicit {
            debug!("Using explicit port {}", port);
            return Ok(port.to_string());
        }

        let ports = source.ports()?;
        match ports.into_iter().find(|p| self.matches(p)) {
            Some(found) => {
                info!(
                    "Found {} on {} ({})",
                    self.device,
                    found.port,
                    found.description()
                );
                Ok(found.port)
            }
            None => Err(DetectError::DeviceNotFound {
                device: self.device.clone(),
                markers: self
                    .markers
                    .iter()
                    .map(|m| format!("{:?}", m))
                    .collect::<Vec<_>>()
                    .join(" or "),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that fails the test if it is ever enumerated
    struct Untouchable;

    impl PortSource for Untouchable {
        fn ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
            panic!("explicit port must not trigger enumeration");
        }
    }

    fn ports() -> Vec<SerialPortInfo> {
        vec![
            SerialPortInfo::new("/dev/ttyS0"),
            SerialPortInfo::new("COM4").with_product("Prolific USB-to-Serial"),
            SerialPortInfo::new("COM9").with_product("USB-SERIAL CH340 (COM9)"),
            SerialPortInfo::new("COM10").with_product("WCH USB-SERIAL"),
        ]
    }

    #[test]
    fn test_explicit_port_wins() {
        let locator = Locator::new("USB composite KM");
        assert_eq!(locator.resolve(Some("COM7"), &Untouchable).unwrap(), "COM7");
    }

    #[test]
    fn test_first_match_wins() {
        let locator = Locator::new("USB composite KM");
        assert_eq!(locator.resolve(None, &ports()).unwrap(), "COM9");
    }

    #[test]
    fn test_wch_marker() {
        let locator = Locator::new("PS/2");
        let ports = vec![
            SerialPortInfo::new("/dev/ttyUSB0").with_product("WCH CDC Serial"),
        ];
        assert_eq!(locator.resolve(None, &ports).unwrap(), "/dev/ttyUSB0");
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let locator = Locator::new("PS/2");
        let ports = vec![
            SerialPortInfo::new("/dev/ttyUSB0").with_product("usb-serial ch340"),
            SerialPortInfo::new("/dev/ttyUSB1").with_product("wch.cn"),
        ];
        assert!(matches!(
            locator.resolve(None, &ports),
            Err(DetectError::DeviceNotFound { .. })
        ));
    }

    #[test]
    fn test_not_found_message_names_device() {
        let locator = Locator::new("PS/2");
        let err = locator.resolve(None, &Vec::<SerialPortInfo>::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PS/2 serial device not found"));
        assert!(message.contains("--port"));
    }

    #[test]
    fn test_custom_markers() {
        let locator = Locator::new("bench rig").with_markers(["Prolific"]);
        assert_eq!(locator.resolve(None, &ports()).unwrap(), "COM4");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn explicit_port_returned_verbatim(port in "\\PC{1,24}") {
                let locator = Locator::new("USB composite KM");
                prop_assert_eq!(locator.resolve(Some(port.as_str()), &ports()).unwrap(), port);
            }
        }
    }
}
