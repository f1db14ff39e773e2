//! Session lifecycle against a virtual device

use std::cell::RefCell;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use km_detect::SerialPortInfo;
use km_protocol::{
    MouseReport, Operation, Personality, Ps2Activation, Ps2Mode, Resolution, UsbMode,
};
use km_session::{PortOpener, Session, SessionConfig, SessionError};
use km_sim::{DeviceEvent, SharedDevice, VirtualDevice};

/// Hands out a shared virtual device and remembers what was opened
struct SimOpener {
    device: SharedDevice,
    opened: RefCell<Vec<(String, u32)>>,
}

impl SimOpener {
    fn new(personality: Personality) -> Self {
        Self {
            device: VirtualDevice::new("sim", personality).shared(),
            opened: RefCell::new(Vec::new()),
        }
    }
}

impl PortOpener for SimOpener {
    type Port = SharedDevice;

    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        _timeout: Duration,
    ) -> Result<Self::Port, serialport::Error> {
        self.opened.borrow_mut().push((port.to_string(), baud_rate));
        Ok(self.device.clone())
    }
}

/// Every open fails as if the port were unplugged
struct MissingOpener;

impl PortOpener for MissingOpener {
    type Port = SharedDevice;

    fn open(
        &self,
        port: &str,
        _baud_rate: u32,
        _timeout: Duration,
    ) -> Result<Self::Port, serialport::Error> {
        Err(serialport::Error::new(
            serialport::ErrorKind::NoDevice,
            format!("{} is not present", port),
        ))
    }
}

/// What happened to a [`TrackedPort`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortEvent {
    Wrote,
    Flushed,
    Dropped,
}

/// Port that logs writes, flushes and its own drop
struct TrackedPort {
    log: Arc<Mutex<Vec<PortEvent>>>,
    fail_writes: bool,
}

impl Write for TrackedPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
        }
        self.log.lock().unwrap().push(PortEvent::Wrote);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.lock().unwrap().push(PortEvent::Flushed);
        Ok(())
    }
}

impl Drop for TrackedPort {
    fn drop(&mut self) {
        self.log.lock().unwrap().push(PortEvent::Dropped);
    }
}

#[derive(Default)]
struct TrackedOpener {
    log: Arc<Mutex<Vec<PortEvent>>>,
    fail_writes: bool,
}

impl TrackedOpener {
    fn log(&self) -> Vec<PortEvent> {
        self.log.lock().unwrap().clone()
    }
}

impl PortOpener for TrackedOpener {
    type Port = TrackedPort;

    fn open(
        &self,
        _port: &str,
        _baud_rate: u32,
        _timeout: Duration,
    ) -> Result<Self::Port, serialport::Error> {
        Ok(TrackedPort {
            log: Arc::clone(&self.log),
            fail_writes: self.fail_writes,
        })
    }
}

fn config(personality: Personality) -> SessionConfig {
    SessionConfig::new(personality)
        .with_settle_delay(Duration::ZERO)
        .with_inter_command_delay(Duration::ZERO)
}

fn ch340_ports() -> Vec<SerialPortInfo> {
    vec![
        SerialPortInfo::new("COM1").with_product("Communications Port"),
        SerialPortInfo::new("COM4").with_product("USB-SERIAL CH340 (COM4)"),
    ]
}

#[test]
fn test_resolves_ch340_port() {
    let opener = SimOpener::new(Personality::UsbComposite);
    let session =
        Session::open_with(&config(Personality::UsbComposite), &ch340_ports(), &opener).unwrap();

    assert_eq!(session.port_name(), "COM4");
    assert!(session.is_open());
    assert_eq!(opener.opened.borrow().as_slice(), &[("COM4".to_string(), 115_200)]);
}

#[test]
fn test_explicit_port_overrides_detection() {
    let opener = SimOpener::new(Personality::Ps2);
    let config = config(Personality::Ps2)
        .with_port("/dev/ttyACM7")
        .with_baud_rate(9600);
    let session = Session::open_with(&config, &ch340_ports(), &opener).unwrap();

    assert_eq!(session.port_name(), "/dev/ttyACM7");
    assert_eq!(
        opener.opened.borrow().as_slice(),
        &[("/dev/ttyACM7".to_string(), 9600)]
    );
}

#[test]
fn test_no_matching_port() {
    let opener = SimOpener::new(Personality::UsbComposite);
    let ports = vec![SerialPortInfo::new("COM1").with_product("Communications Port")];
    let err = Session::open_with(&config(Personality::UsbComposite), &ports, &opener).unwrap_err();

    assert!(err.is_device_not_found());
    assert!(err.to_string().contains("--port"));
    assert!(opener.opened.borrow().is_empty());
}

#[test]
fn test_open_failure_names_port() {
    let config = config(Personality::Ps2).with_port("COM9");
    let err = Session::open_with(&config, &Vec::<SerialPortInfo>::new(), &MissingOpener)
        .unwrap_err();

    match err {
        SessionError::PortOpen { port, source } => {
            assert_eq!(port, "COM9");
            assert_eq!(source.kind(), serialport::ErrorKind::NoDevice);
        }
        other => panic!("expected PortOpen, got {:?}", other),
    }
}

#[test]
fn test_usb_sequence_drives_device() {
    let opener = SimOpener::new(Personality::UsbComposite);
    let mut session =
        Session::open_with(&config(Personality::UsbComposite), &ch340_ports(), &opener).unwrap();

    let operations = [
        Operation::RemoteControl,
        Operation::SetResolution(Resolution::new(1920, 1080)),
        Operation::AbsoluteMouseMode,
        Operation::MoveAbsolute(MouseReport::new(960, 540).with_left(true)),
        Operation::KeyboardMode,
        Operation::Text("hello".into()),
    ];
    session.execute_all(&operations).unwrap();
    assert_eq!(session.frames_sent(), 6);

    let state = opener.device.state();
    assert_eq!(state.usb_mode, UsbMode::Keyboard);
    assert_eq!(state.resolution, Some(Resolution::new(1920, 1080)));

    let events = opener.device.events();
    assert_eq!(
        events,
        vec![
            DeviceEvent::Pointer {
                absolute: true,
                report: MouseReport::new(960, 540).with_left(true).with_wheel(Some(0)),
            },
            DeviceEvent::Keys("hello".into()),
        ]
    );
}

#[test]
fn test_ps2_sequence_drives_device() {
    let opener = SimOpener::new(Personality::Ps2);
    let mut session =
        Session::open_with(&config(Personality::Ps2), &ch340_ports(), &opener).unwrap();

    session.execute(&Operation::SimulationOn).unwrap();
    session.execute(&Operation::MouseMode).unwrap();
    session
        .execute(&Operation::MoveRelative(MouseReport::new(5, 5).with_right(true)))
        .unwrap();

    let state = opener.device.state();
    assert_eq!(state.ps2_activation, Ps2Activation::Simulating);
    assert_eq!(state.ps2_mode, Some(Ps2Mode::Mouse));
    assert_eq!(
        opener.device.received(),
        b"#0xC3@PS2cmd10\r\n#0xA1@PS2cmd\r\n5,5,0,1,0\r\n"
    );
}

#[test]
fn test_unsupported_operation_sends_nothing() {
    let opener = SimOpener::new(Personality::Ps2);
    let mut session =
        Session::open_with(&config(Personality::Ps2), &ch340_ports(), &opener).unwrap();

    let err = session
        .execute(&Operation::SetResolution(Resolution::new(800, 600)))
        .unwrap_err();
    assert!(matches!(err, SessionError::Encoding(_)));
    assert!(opener.device.received().is_empty());
    assert!(session.is_open());
}

#[test]
fn test_closed_session_rejects_sends() {
    let opener = SimOpener::new(Personality::UsbComposite);
    let mut session =
        Session::open_with(&config(Personality::UsbComposite), &ch340_ports(), &opener).unwrap();

    session.execute(&Operation::Status).unwrap();
    session.close();
    session.close();

    assert!(matches!(
        session.execute(&Operation::Status),
        Err(SessionError::Closed)
    ));
    assert_eq!(opener.device.received(), b"#0xX24@GET\r\n");
}

#[test]
fn test_drop_releases_port() {
    use PortEvent::*;

    let opener = TrackedOpener::default();
    {
        let mut session =
            Session::open_with(&config(Personality::UsbComposite), &ch340_ports(), &opener)
                .unwrap();
        session.execute(&Operation::Idle).unwrap();
        assert_eq!(opener.log(), [Wrote, Flushed]);
    }
    // Dropping flushes through close before the port goes away
    assert_eq!(opener.log(), [Wrote, Flushed, Flushed, Dropped]);
}

#[test]
fn test_port_released_after_encoding_error() {
    use PortEvent::*;

    let opener = TrackedOpener::default();
    let result = (|| -> Result<(), SessionError> {
        let mut session =
            Session::open_with(&config(Personality::Ps2), &ch340_ports(), &opener)?;
        session.execute(&Operation::Status)?;
        Ok(())
    })();

    assert!(matches!(result, Err(SessionError::Encoding(_))));
    assert_eq!(opener.log(), [Flushed, Dropped]);
}

#[test]
fn test_port_released_after_transport_error() {
    use PortEvent::*;

    let opener = TrackedOpener {
        fail_writes: true,
        ..Default::default()
    };
    let result = (|| -> Result<(), SessionError> {
        let mut session =
            Session::open_with(&config(Personality::UsbComposite), &ch340_ports(), &opener)?;
        session.execute(&Operation::Reboot)?;
        Ok(())
    })();

    assert!(matches!(result, Err(SessionError::Transport(_))));
    assert_eq!(opener.log(), [Flushed, Dropped]);
}

#[test]
fn test_default_usb_timing() {
    let opener = SimOpener::new(Personality::UsbComposite);
    let config = SessionConfig::new(Personality::UsbComposite).with_port("COM4");

    let start = Instant::now();
    let mut session = Session::open_with(&config, &ch340_ports(), &opener).unwrap();
    let opened = start.elapsed();
    assert!(opened >= Duration::from_millis(100), "settle was {:?}", opened);

    session.execute(&Operation::RelativeMouseMode).unwrap();
    session
        .execute(&Operation::MoveRelative(MouseReport::new(1, 1)))
        .unwrap();
    let paced = start.elapsed() - opened;
    assert!(paced >= Duration::from_millis(100), "two sends took {:?}", paced);
}

#[test]
fn test_default_ps2_sends_back_to_back() {
    let opener = SimOpener::new(Personality::Ps2);
    let config = SessionConfig::new(Personality::Ps2)
        .with_port("COM25")
        .with_settle_delay(Duration::ZERO);
    let mut session = Session::open_with(&config, &ch340_ports(), &opener).unwrap();

    let start = Instant::now();
    for _ in 0..20 {
        session.execute(&Operation::SimulationOn).unwrap();
    }
    // Twenty USB-paced sends would take a full second
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(session.frames_sent(), 20);
}

mod proptest_tests {
    use super::*;
    use km_protocol::EncodeCommand;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn device_sees_exactly_what_was_sent(moves in prop::collection::vec((-127i32..=127, -127i32..=127), 0..20)) {
            let opener = SimOpener::new(Personality::UsbComposite);
            let mut session = Session::open_with(
                &config(Personality::UsbComposite),
                &ch340_ports(),
                &opener,
            )
            .unwrap();

            let operations: Vec<Operation> = std::iter::once(Operation::RelativeMouseMode)
                .chain(moves.iter().map(|&(dx, dy)| Operation::MoveRelative(MouseReport::new(dx, dy))))
                .collect();
            session.execute_all(&operations).unwrap();

            let expected: Vec<u8> = operations
                .iter()
                .flat_map(|op| op.encode_frame(Personality::UsbComposite).unwrap().encode())
                .collect();
            prop_assert_eq!(session.frames_sent(), operations.len());
            prop_assert_eq!(opener.device.received(), expected);
            prop_assert_eq!(opener.device.events().len(), moves.len());
        }
    }
}
