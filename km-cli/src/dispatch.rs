//! Subcommand execution
//!
//! Each device subcommand becomes a list of operations sent over one
//! session. The session is closed on every path out of [`run`].

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use km_detect::PortScanner;
use km_protocol::{MouseReport, Operation, Personality, Resolution};
use km_session::{Session, SessionConfig};
use tracing::{info, warn};

use crate::cli::{Command, Ps2Command, UsbCommand};
use crate::heartbeat::Heartbeat;
use crate::{ports, scancode};

/// Operations for a USB subcommand
pub fn usb_operations(command: &UsbCommand) -> Vec<Operation> {
    match command {
        UsbCommand::Rel => vec![Operation::RelativeMouseMode],
        UsbCommand::Abs => vec![Operation::AbsoluteMouseMode],
        UsbCommand::Key => vec![Operation::KeyboardMode],
        UsbCommand::Idle => vec![Operation::Idle],
        UsbCommand::Local => vec![Operation::LocalControl],
        UsbCommand::Remote => vec![Operation::RemoteControl],
        UsbCommand::Move { dx, dy, buttons } => {
            vec![Operation::MoveRelative(buttons.report(*dx, *dy))]
        }
        UsbCommand::AbsMove { x, y, buttons } => {
            vec![Operation::MoveAbsolute(buttons.report(*x, *y))]
        }
        UsbCommand::Res { width, height } => {
            vec![Operation::SetResolution(Resolution::new(*width, *height))]
        }
        UsbCommand::Text { content } => {
            vec![Operation::KeyboardMode, Operation::Text(content.clone())]
        }
        UsbCommand::Combo { combo } => {
            vec![Operation::KeyboardMode, Operation::Combo(combo.clone())]
        }
        UsbCommand::Fwinfo => vec![Operation::FirmwareInfo],
        UsbCommand::Status => vec![Operation::Status],
        UsbCommand::DebugOn => vec![Operation::Debug { enabled: true }],
        UsbCommand::DebugOff => vec![Operation::Debug { enabled: false }],
        UsbCommand::Reboot => vec![Operation::Reboot],
    }
}

/// Operations for a PS/2 subcommand
pub fn ps2_operations(command: &Ps2Command) -> Vec<Operation> {
    match command {
        Ps2Command::SimOn => vec![Operation::SimulationOn],
        Ps2Command::SimOff => vec![Operation::SimulationOff],
        Ps2Command::Mouse => vec![Operation::MouseMode],
        Ps2Command::Key => vec![Operation::KeyboardMode],
        Ps2Command::Exit => vec![Operation::Exit],
        Ps2Command::Reboot => vec![Operation::Reboot],
        Ps2Command::Move { dx, dy, buttons } => {
            vec![Operation::MoveRelative(buttons.report(*dx, *dy))]
        }
        Ps2Command::Click { button, double } => {
            let clicks = if *double { 2 } else { 1 };
            let press = Operation::MoveRelative(button.press());
            let release = Operation::MoveRelative(MouseReport::new(0, 0));
            (0..clicks)
                .flat_map(|_| [press.clone(), release.clone()])
                .collect()
        }
        Ps2Command::Type { text } => vec![Operation::Text(text.clone())],
        Ps2Command::TypeString { text, enter } => scancode::keystrokes(text, *enter),
    }
}

/// Send operations in order, stopping at the first failure
pub fn send_all<P: Write>(session: &mut Session<P>, operations: &[Operation]) -> Result<()> {
    for operation in operations {
        session
            .execute(operation)
            .with_context(|| format!("{} on {} failed", operation.kind(), session.port_name()))?;
    }
    info!(
        "Sent {} frame(s) to {} ({})",
        session.frames_sent(),
        session.port_name(),
        session.personality()
    );
    Ok(())
}

fn execute(config: &SessionConfig, operations: &[Operation]) -> Result<()> {
    if operations.is_empty() {
        warn!("Nothing to send");
        return Ok(());
    }

    let mut session = Session::open(config)
        .with_context(|| format!("cannot reach {} device", config.personality))?;
    let result = send_all(&mut session, operations);
    session.close();
    result
}

/// Run a parsed command
pub fn run(command: &Command) -> Result<()> {
    match command {
        Command::Usb { conn, command } => execute(
            &conn.session_config(Personality::UsbComposite),
            &usb_operations(command),
        ),
        Command::Ps2 { conn, command } => {
            execute(&conn.session_config(Personality::Ps2), &ps2_operations(command))
        }
        Command::Heartbeat {
            conn,
            byte,
            interval_ms,
            count,
            target,
        } => {
            // Beats are paced by the interval alone
            let config = conn
                .session_config((*target).into())
                .with_inter_command_delay(Duration::ZERO);
            let heartbeat = Heartbeat {
                byte: *byte,
                interval: Duration::from_millis(*interval_ms),
                count: *count,
            };

            let mut session = Session::open(&config)
                .with_context(|| format!("cannot reach {} device", config.personality))?;
            info!(
                "Sending 0x{:02X} to {} every {:?}",
                heartbeat.byte,
                session.port_name(),
                heartbeat.interval
            );
            let result = heartbeat.run(&mut session);
            session.close();
            let sent = result.context("heartbeat stopped")?;
            info!("Sent {} heartbeat(s)", sent);
            Ok(())
        }
        Command::Ports => ports::list(&PortScanner::new(), &mut io::stdout().lock()),
    }
}
