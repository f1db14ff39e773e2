//! kmctl
//!
//! Command-line controller for keyboard/mouse emulator boards. Every
//! invocation opens the device's serial bridge, sends a handful of frames
//! and exits; nothing is read back from the device.

mod cli;
mod dispatch;
mod heartbeat;
mod ports;
mod scancode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;

const DEFAULT_FILTER: &str = "kmctl=info,km_protocol=info,km_detect=info,km_session=info";
const VERBOSE_FILTER: &str = "kmctl=debug,km_protocol=debug,km_detect=debug,km_session=debug";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let default_filter = if cli.verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dispatch::run(&cli.command)
}
