//! `kmctl ports` listing

use std::io::Write;

use km_detect::usb_ids::{adapter_name, is_wch_bridge};
use km_detect::{Locator, PortSource, SerialPortInfo};

/// One listing line; `*` marks ports the locator would pick from
fn describe(info: &SerialPortInfo, locator: &Locator) -> String {
    let marker = if locator.matches(info) { '*' } else { ' ' };
    let mut line = format!("{} {:<16} {}", marker, info.port, info.description());

    if let (Some(vid), Some(pid)) = (info.vid, info.pid) {
        line.push_str(&format!(" [{:04X}:{:04X}", vid, pid));
        if let Some(adapter) = adapter_name(vid) {
            line.push_str(&format!(" {}", adapter));
        }
        line.push(']');
        if is_wch_bridge(vid, pid) && !locator.matches(info) {
            line.push_str(" (WCH bridge with unexpected description)");
        }
    }
    line
}

/// Print every enumerated port
pub fn list<S, W>(source: &S, out: &mut W) -> anyhow::Result<()>
where
    S: PortSource + ?Sized,
    W: Write,
{
    let ports = source.ports()?;
    if ports.is_empty() {
        writeln!(out, "No serial ports found")?;
        return Ok(());
    }

    let locator = Locator::new("emulator");
    for info in &ports {
        writeln!(out, "{}", describe(info, &locator))?;
    }
    Ok(())
}
