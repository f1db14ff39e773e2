//! Command line definition

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use km_protocol::{MouseReport, Personality};
use km_session::{SessionConfig, DEFAULT_BAUD_RATE};

/// Drive a USB/PS2 keyboard-mouse emulator over its serial bridge
#[derive(Parser, Debug)]
#[command(name = "kmctl", version)]
pub struct Cli {
    /// Log frames and port handling at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// USB composite keyboard/mouse
    Usb {
        #[command(flatten)]
        conn: ConnectionArgs,
        #[command(subcommand)]
        command: UsbCommand,
    },
    /// PS/2 mouse/keyboard emulation
    Ps2 {
        #[command(flatten)]
        conn: ConnectionArgs,
        #[command(subcommand)]
        command: Ps2Command,
    },
    /// Send a single raw byte at a fixed interval
    Heartbeat {
        #[command(flatten)]
        conn: ConnectionArgs,
        /// Byte to send, in hex
        #[arg(long, default_value = "EE", value_parser = parse_hex_byte)]
        byte: u8,
        /// Pause between beats
        #[arg(long = "interval-ms", default_value_t = 1000)]
        interval_ms: u64,
        /// Stop after this many beats; runs until interrupted if omitted
        #[arg(long)]
        count: Option<u64>,
        /// Which device to look for when no port is given
        #[arg(long, value_enum, default_value_t = Target::Usb)]
        target: Target,
    },
    /// List serial ports and mark likely emulator bridges
    Ports,
}

/// Port and timing options shared by every device command
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Serial port (auto-detected if omitted)
    #[arg(short = 'p', long = "port")]
    pub port: Option<String>,

    /// Baud rate
    #[arg(long = "baud", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// Pause after each frame (defaults to the personality's own)
    #[arg(long = "delay-ms")]
    pub delay_ms: Option<u64>,
}

impl ConnectionArgs {
    pub fn session_config(&self, personality: Personality) -> SessionConfig {
        let mut config = SessionConfig::new(personality).with_baud_rate(self.baud);
        if let Some(port) = &self.port {
            config = config.with_port(port.clone());
        }
        if let Some(ms) = self.delay_ms {
            config = config.with_inter_command_delay(Duration::from_millis(ms));
        }
        config
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Usb,
    Ps2,
}

impl From<Target> for Personality {
    fn from(target: Target) -> Self {
        match target {
            Target::Usb => Personality::UsbComposite,
            Target::Ps2 => Personality::Ps2,
        }
    }
}

/// Mouse button for `click`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Middle,
}

impl Button {
    /// A motionless report with only this button held
    pub fn press(self) -> MouseReport {
        let report = MouseReport::new(0, 0);
        match self {
            Button::Left => report.with_left(true),
            Button::Right => report.with_right(true),
            Button::Middle => report.with_middle(true),
        }
    }
}

/// Button and wheel flags for pointer reports
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ButtonArgs {
    /// Hold the left button
    #[arg(long)]
    pub left: bool,
    /// Hold the right button
    #[arg(long)]
    pub right: bool,
    /// Hold the middle button
    #[arg(long)]
    pub middle: bool,
    /// Wheel delta
    #[arg(long, allow_negative_numbers = true)]
    pub wheel: Option<i32>,
}

impl ButtonArgs {
    pub fn report(&self, x: i32, y: i32) -> MouseReport {
        MouseReport::new(x, y)
            .with_left(self.left)
            .with_right(self.right)
            .with_middle(self.middle)
            .with_wheel(self.wheel)
    }
}

#[derive(Subcommand, Debug)]
pub enum UsbCommand {
    /// Relative mouse mode
    Rel,
    /// Absolute mouse mode
    Abs,
    /// Keyboard mode
    Key,
    /// Return to idle
    Idle,
    /// Hand control to the local input devices
    Local,
    /// Hand control to this host
    Remote,
    /// Relative move (REL mode)
    Move {
        #[arg(allow_negative_numbers = true)]
        dx: i32,
        #[arg(allow_negative_numbers = true)]
        dy: i32,
        #[command(flatten)]
        buttons: ButtonArgs,
    },
    /// Absolute position (ABS mode)
    AbsMove {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        #[command(flatten)]
        buttons: ButtonArgs,
    },
    /// Screen resolution used for absolute mapping
    Res { width: u32, height: u32 },
    /// Type a string (switches to keyboard mode first)
    Text { content: String },
    /// Send a key combination such as CTRL+ALT+DEL (switches to keyboard mode first)
    Combo { combo: String },
    /// Query firmware version
    Fwinfo,
    /// Query mode and control source
    Status,
    /// Enable firmware debug output
    DebugOn,
    /// Disable firmware debug output
    DebugOff,
    /// Soft-reset the microcontroller
    Reboot,
}

#[derive(Subcommand, Debug)]
pub enum Ps2Command {
    /// Start driving the PS/2 lines
    SimOn,
    /// Release the PS/2 lines
    SimOff,
    /// PS/2 mouse mode
    Mouse,
    /// PS/2 keyboard mode
    Key,
    /// Leave the current PS/2 mode
    Exit,
    /// Soft-reset the microcontroller
    Reboot,
    /// Mouse report; the wheel field is sent only when given
    Move {
        #[arg(allow_negative_numbers = true)]
        dx: i32,
        #[arg(allow_negative_numbers = true)]
        dy: i32,
        #[command(flatten)]
        buttons: ButtonArgs,
    },
    /// Press and release a button without moving
    Click {
        #[arg(value_enum, default_value_t = Button::Left)]
        button: Button,
        /// Click twice
        #[arg(long)]
        double: bool,
    },
    /// Send TEXT verbatim (scan codes or a combo)
    Type { text: String },
    /// Translate TEXT to set-2 scan codes, one frame per key
    TypeString {
        text: String,
        /// Finish with Enter
        #[arg(long)]
        enter: bool,
    },
}

/// Parse `EE`, `0xEE` or `0XEE`
fn parse_hex_byte(s: &str) -> Result<u8, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid hex byte {:?}: {}", s, e))
}
