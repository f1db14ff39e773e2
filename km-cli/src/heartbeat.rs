//! Fixed-interval single-byte keepalive

use std::io::Write;
use std::thread;
use std::time::Duration;

use km_session::{Session, SessionError};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct Heartbeat {
    pub byte: u8,
    pub interval: Duration,
    /// Beats to send; `None` runs until the process is stopped
    pub count: Option<u64>,
}

impl Heartbeat {
    /// Send beats on `session`, returning how many were written
    pub fn run<P: Write>(&self, session: &mut Session<P>) -> Result<u64, SessionError> {
        let mut sent = 0;
        while self.count.map_or(true, |n| sent < n) {
            if sent > 0 {
                thread::sleep(self.interval);
            }
            session.send(&[self.byte])?;
            sent += 1;
            debug!("Heartbeat {} (0x{:02X})", sent, self.byte);
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_protocol::Personality;
    use km_session::SessionConfig;
    use km_sim::VirtualDevice;

    fn session() -> (km_sim::SharedDevice, Session<km_sim::SharedDevice>) {
        let device = VirtualDevice::new("hb", Personality::UsbComposite).shared();
        let config =
            SessionConfig::new(Personality::UsbComposite).with_inter_command_delay(Duration::ZERO);
        let session = Session::from_port("COM12", device.clone(), &config);
        (device, session)
    }

    #[test]
    fn test_sends_count_beats() {
        let (device, mut session) = session();
        let heartbeat = Heartbeat {
            byte: 0xEE,
            interval: Duration::ZERO,
            count: Some(3),
        };
        assert_eq!(heartbeat.run(&mut session).unwrap(), 3);
        assert_eq!(device.received(), vec![0xEE; 3]);
        // Raw beats are not frames
        assert!(device.lock().frames().is_empty());
    }

    #[test]
    fn test_zero_count_sends_nothing() {
        let (device, mut session) = session();
        let heartbeat = Heartbeat {
            byte: 0x55,
            interval: Duration::from_secs(60),
            count: Some(0),
        };
        assert_eq!(heartbeat.run(&mut session).unwrap(), 0);
        assert!(device.received().is_empty());
    }

    #[test]
    fn test_stops_on_closed_session() {
        let (_device, mut session) = session();
        session.close();
        let heartbeat = Heartbeat {
            byte: 0xEE,
            interval: Duration::ZERO,
            count: None,
        };
        assert!(matches!(
            heartbeat.run(&mut session),
            Err(SessionError::Closed)
        ));
    }
}
