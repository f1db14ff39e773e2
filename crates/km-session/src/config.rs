//! Session configuration
//!
//! Defaults match the emulator firmware's UART settings. There is no
//! process-wide state: every session is opened from an explicit
//! [`SessionConfig`].

use std::time::Duration;

use km_protocol::Personality;

/// UART baud rate of the emulator firmware
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Read timeout handed to the OS serial driver
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Pause after opening, while the bridge settles after line assertion
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Parameters for opening a [`Session`](crate::Session)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Personality used to encode operations
    pub personality: Personality,
    /// Explicit port; auto-detected when `None`
    pub port: Option<String>,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout for the underlying port
    pub read_timeout: Duration,
    /// Pause after opening
    pub settle_delay: Duration,
    /// Pause after each frame; `None` uses the personality's default
    pub inter_command_delay: Option<Duration>,
}

impl SessionConfig {
    /// Defaults for the given personality
    pub fn new(personality: Personality) -> Self {
        Self {
            personality,
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            inter_command_delay: None,
        }
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_inter_command_delay(mut self, delay: Duration) -> Self {
        self.inter_command_delay = Some(delay);
        self
    }

    /// Pause applied after each frame
    pub fn effective_inter_command_delay(&self) -> Duration {
        self.inter_command_delay
            .unwrap_or_else(|| self.personality.inter_command_delay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new(Personality::UsbComposite);
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.read_timeout, Duration::from_millis(500));
        assert_eq!(config.settle_delay, Duration::from_millis(100));
        assert_eq!(config.port, None);
    }

    #[test]
    fn test_delay_policy_per_personality() {
        let usb = SessionConfig::new(Personality::UsbComposite);
        assert_eq!(usb.effective_inter_command_delay(), Duration::from_millis(50));

        let ps2 = SessionConfig::new(Personality::Ps2);
        assert_eq!(ps2.effective_inter_command_delay(), Duration::ZERO);

        let ps2 = ps2.with_inter_command_delay(Duration::from_millis(50));
        assert_eq!(ps2.effective_inter_command_delay(), Duration::from_millis(50));
    }
}
