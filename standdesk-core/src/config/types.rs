//! Configuration type definitions
//!
//! These types represent the desk controller configuration. The firmware
//! parses them from `desk.toml` at boot; everything has a default that
//! matches the stock handset.

use standdesk_protocol::{Button, ButtonCommand};

use crate::state::link::DEFAULT_LINK_TIMEOUT_MS;
use crate::state::tracker::DEFAULT_DEBOUNCE_MS;
use crate::timer::alarm::DEFAULT_ALARM_RETRY_MS;

/// Baud rate of the handset bus
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default poll cadence (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 500;

/// Default countdown tick (ms)
pub const DEFAULT_TIMER_TICK_MS: u32 = 1000;

/// Default minimum spacing of malformed-frame log lines (ms)
pub const DEFAULT_MALFORMED_LOG_INTERVAL_MS: u32 = 5000;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate of zero
    InvalidBaudRate,
    /// TX and RX on the same pin
    PinConflict(u8),
    /// Poll interval or timer tick of zero
    ZeroInterval,
    /// Link timeout shorter than one poll interval
    LinkTimeoutTooShort,
}

/// UART wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate (the handset bus runs 9600 8N1)
    pub baud_rate: u32,
    /// TX GPIO number
    pub tx_pin: u8,
    /// RX GPIO number
    pub rx_pin: u8,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            tx_pin: 0,
            rx_pin: 1,
        }
    }
}

/// Poll cadence and protocol timings, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    pub poll_interval_ms: u32,
    /// Silence before the link counts as lost
    pub link_timeout_ms: u32,
    /// Window in which an unchanged display is not re-processed
    pub debounce_ms: u32,
    /// Elapsed poll time per countdown second
    pub timer_tick_ms: u32,
    /// Delay between alarm menu presses once the display moved
    pub alarm_retry_ms: u32,
    pub malformed_log_interval_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            link_timeout_ms: DEFAULT_LINK_TIMEOUT_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            timer_tick_ms: DEFAULT_TIMER_TICK_MS,
            alarm_retry_ms: DEFAULT_ALARM_RETRY_MS,
            malformed_log_interval_ms: DEFAULT_MALFORMED_LOG_INTERVAL_MS,
        }
    }
}

/// Key payload bound to each button; `None` leaves the button unbound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMap {
    commands: [Option<ButtonCommand>; Button::COUNT],
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            commands: Button::ALL.map(|b| Some(ButtonCommand::with_default_key(b))),
        }
    }
}

impl ButtonMap {
    /// Map with every button unbound
    pub fn empty() -> Self {
        Self {
            commands: core::array::from_fn(|_| None),
        }
    }

    /// Command bound to `button`
    pub fn get(&self, button: Button) -> Option<&ButtonCommand> {
        self.commands[button.index()].as_ref()
    }

    /// Bind a command, replacing any previous binding for its button
    pub fn bind(&mut self, command: ButtonCommand) {
        let index = command.button.index();
        self.commands[index] = Some(command);
    }

    /// Remove a binding
    pub fn unbind(&mut self, button: Button) {
        self.commands[button.index()] = None;
    }

    /// Number of bound buttons
    pub fn bound(&self) -> usize {
        self.commands.iter().filter(|c| c.is_some()).count()
    }
}

/// Complete desk controller configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeskConfig {
    pub uart: UartConfig,
    pub timing: TimingConfig,
    pub buttons: ButtonMap,
}

impl DeskConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uart.baud_rate == 0 {
            return Err(ConfigError::InvalidBaudRate);
        }
        if self.uart.tx_pin == self.uart.rx_pin {
            return Err(ConfigError::PinConflict(self.uart.tx_pin));
        }
        if self.timing.poll_interval_ms == 0 || self.timing.timer_tick_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.timing.link_timeout_ms < self.timing.poll_interval_ms {
            return Err(ConfigError::LinkTimeoutTooShort);
        }
        Ok(())
    }
}
