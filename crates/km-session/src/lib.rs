//! KM Serial Sessions
//!
//! A [`Session`] owns one open serial connection to an emulator device for
//! the length of a single invocation. It resolves the port through
//! [`km_detect::Locator`], waits for the device's USB/UART bridge to settle,
//! then writes frames fire-and-forget: nothing is ever read back.
//!
//! # Lifecycle
//!
//! ```text
//! open ──▶ settle ──▶ send ─▶ pause ─▶ send ─▶ pause ... ──▶ close
//! ```
//!
//! `close` is idempotent and also runs on drop, so the port is released on
//! every exit path.
//!
//! # Concurrency
//!
//! Sessions are single-owner. Every send takes `&mut self`; sharing one
//! session between threads is not supported.
//!
//! # Example
//!
//! ```rust,no_run
//! use km_protocol::{Operation, Personality};
//! use km_session::{Session, SessionConfig};
//!
//! let config = SessionConfig::new(Personality::Ps2).with_port("COM25");
//! let mut session = Session::open(&config)?;
//! session.execute(&Operation::SimulationOn)?;
//! session.close();
//! # Ok::<(), km_session::SessionError>(())
//! ```

pub mod config;
pub mod error;
pub mod opener;
pub mod session;

pub use config::{
    SessionConfig, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT, DEFAULT_SETTLE_DELAY,
};
pub use error::SessionError;
pub use opener::{PortOpener, SerialOpener};
pub use session::Session;
