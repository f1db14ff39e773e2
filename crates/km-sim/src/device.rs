//! Virtual emulator device
//!
//! Models the firmware's mode state machine for both personalities:
//!
//! ```text
//! USB:  Idle ──▶ {RelativeMouse, AbsoluteMouse, Keyboard}   (+ Local/Remote)
//! PS/2: Passthrough ⇄ Simulating, each with {none, Mouse, Keyboard}
//! ```
//!
//! Transitions happen only on opcode frames. Bare payloads are interpreted
//! against the current mode; a payload that does not fit the mode is
//! recorded as ignored rather than rejected, since the real firmware gives
//! no feedback either.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use km_protocol::{
    ControlSource, Frame, FrameCodec, MouseReport, OperationKind, Personality, ProtocolCodec,
    Ps2Activation, Ps2Mode, Resolution, UsbMode,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Device-side state reachable through opcode frames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    /// USB composite input mode
    pub usb_mode: UsbMode,
    /// USB control source; unknown until first set
    pub control: Option<ControlSource>,
    /// Screen size for absolute mapping
    pub resolution: Option<Resolution>,
    /// Firmware debug logging
    pub debug: bool,
    /// PS/2 impersonated device
    pub ps2_mode: Option<Ps2Mode>,
    /// PS/2 line ownership
    pub ps2_activation: Ps2Activation,
}

/// Something the device did in response to a frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// Pointer report delivered downstream
    Pointer { absolute: bool, report: MouseReport },
    /// Keyboard payload delivered downstream
    Keys(String),
    /// Status or firmware-info query received
    Query(OperationKind),
    /// Power-on reset
    Rebooted,
    /// Payload dropped because the current mode cannot use it
    Ignored { payload: String, reason: String },
    /// Opcode not in this personality's table
    Unrecognized(String),
}

/// A simulated emulator device
#[derive(Debug)]
pub struct VirtualDevice {
    /// Identifier for logging
    id: String,
    personality: Personality,
    codec: FrameCodec,
    state: DeviceState,
    /// Frames received (for test verification)
    frames: Vec<Frame>,
    /// Raw bytes received
    received: Vec<u8>,
    events: Vec<DeviceEvent>,
}

impl VirtualDevice {
    /// Create a device at power-on state
    pub fn new(id: impl Into<String>, personality: Personality) -> Self {
        Self {
            id: id.into(),
            personality,
            codec: FrameCodec::new(),
            state: DeviceState::default(),
            frames: Vec::new(),
            received: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Frames decoded so far
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Raw bytes received so far
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    pub fn events(&self) -> &[DeviceEvent] {
        &self.events
    }

    /// Drain recorded events
    pub fn take_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Wrap in a cloneable handle that can be moved into a session
    pub fn shared(self) -> SharedDevice {
        SharedDevice(Arc::new(Mutex::new(self)))
    }

    /// Feed bytes from the wire
    pub fn process_bytes(&mut self, data: &[u8]) {
        self.received.extend_from_slice(data);
        self.codec.push_bytes(data);
        while let Some(frame) = self.codec.next_frame() {
            self.apply(&frame);
            self.frames.push(frame);
        }
    }

    /// Apply one decoded frame
    pub fn apply(&mut self, frame: &Frame) {
        debug!("[{}] <- {}", self.id, frame);
        match frame.opcode() {
            Some(opcode) => match self.personality.operation_for_opcode(opcode) {
                Some(kind) => self.apply_opcode(kind, frame.param()),
                None => {
                    warn!("[{}] unrecognized opcode {}", self.id, opcode);
                    self.events.push(DeviceEvent::Unrecognized(opcode.to_string()));
                }
            },
            None => {
                if let Some(payload) = frame.param() {
                    self.apply_payload(payload);
                }
            }
        }
    }

    fn apply_opcode(&mut self, kind: OperationKind, param: Option<&str>) {
        use OperationKind::*;

        match (self.personality, kind) {
            (Personality::UsbComposite, RelativeMouseMode) => {
                self.state.usb_mode = UsbMode::RelativeMouse
            }
            (Personality::UsbComposite, AbsoluteMouseMode) => {
                self.state.usb_mode = UsbMode::AbsoluteMouse
            }
            (Personality::UsbComposite, KeyboardMode) => self.state.usb_mode = UsbMode::Keyboard,
            (Personality::UsbComposite, Idle) => self.state.usb_mode = UsbMode::Idle,
            (_, LocalControl) => self.state.control = Some(ControlSource::Local),
            (_, RemoteControl) => self.state.control = Some(ControlSource::Remote),
            (_, SetResolution) => match param.map(str::parse::<Resolution>) {
                Some(Ok(res)) => self.state.resolution = Some(res),
                _ => warn!("[{}] bad resolution parameter {:?}", self.id, param),
            },
            (_, DebugOn) => self.state.debug = true,
            (_, DebugOff) => self.state.debug = false,
            (_, FirmwareInfo) | (_, Status) => self.events.push(DeviceEvent::Query(kind)),
            (_, SimulationOn) => self.state.ps2_activation = Ps2Activation::Simulating,
            (_, SimulationOff) => self.state.ps2_activation = Ps2Activation::Passthrough,
            (Personality::Ps2, MouseMode) => self.state.ps2_mode = Some(Ps2Mode::Mouse),
            (Personality::Ps2, KeyboardMode) => self.state.ps2_mode = Some(Ps2Mode::Keyboard),
            (Personality::Ps2, Exit) => self.state.ps2_mode = None,
            (_, Reboot) => {
                self.state = DeviceState::default();
                self.events.push(DeviceEvent::Rebooted);
            }
            (personality, kind) => {
                warn!("[{}] {} has no effect in {} mode", self.id, kind, personality)
            }
        }
    }

    fn apply_payload(&mut self, payload: &str) {
        let event = match self.personality {
            Personality::UsbComposite => match self.state.usb_mode {
                mode if mode.is_pointer() => pointer(payload, mode == UsbMode::AbsoluteMouse),
                UsbMode::Keyboard => DeviceEvent::Keys(payload.to_string()),
                _ => ignored(payload, "device is idle"),
            },
            Personality::Ps2 => match (self.state.ps2_activation, self.state.ps2_mode) {
                (Ps2Activation::Passthrough, _) => ignored(payload, "PS/2 lines not simulated"),
                (Ps2Activation::Simulating, Some(Ps2Mode::Mouse)) => pointer(payload, false),
                (Ps2Activation::Simulating, Some(Ps2Mode::Keyboard)) => {
                    DeviceEvent::Keys(payload.to_string())
                }
                (Ps2Activation::Simulating, None) => ignored(payload, "no PS/2 mode selected"),
            },
        };
        self.events.push(event);
    }
}

fn pointer(payload: &str, absolute: bool) -> DeviceEvent {
    match MouseReport::parse(payload) {
        Ok(report) => DeviceEvent::Pointer { absolute, report },
        Err(e) => ignored(payload, &e.to_string()),
    }
}

fn ignored(payload: &str, reason: &str) -> DeviceEvent {
    DeviceEvent::Ignored {
        payload: payload.to_string(),
        reason: reason.to_string(),
    }
}

impl io::Write for VirtualDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.process_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Cloneable handle to a [`VirtualDevice`]
///
/// Hand one clone to the code under test as its port and keep another to
/// inspect what arrived.
#[derive(Debug, Clone)]
pub struct SharedDevice(Arc<Mutex<VirtualDevice>>);

impl SharedDevice {
    /// Lock the device for inspection
    pub fn lock(&self) -> MutexGuard<'_, VirtualDevice> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the device state
    pub fn state(&self) -> DeviceState {
        self.lock().state().clone()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<DeviceEvent> {
        self.lock().events().to_vec()
    }

    /// Snapshot of the raw bytes received
    pub fn received(&self) -> Vec<u8> {
        self.lock().received().to_vec()
    }
}

impl io::Write for SharedDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
