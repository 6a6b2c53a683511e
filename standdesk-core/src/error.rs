//! Errors reported by desk actions

use standdesk_protocol::Button;

/// Errors that can occur when acting on the desk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeskError {
    /// Timer or alarm duration outside 1..=99
    InvalidDuration(u8),
    /// Button has no payload configured
    UnknownButton(Option<Button>),
    /// UART write failed
    Uart,
}
