//! Button dispatcher
//!
//! Emulates handset presses by writing the configured key frame. Presses
//! are fire-and-forget: one write, no retry, no acknowledgement.

use heapless::Vec;
use standdesk_protocol::{Button, MAX_FRAME_SIZE};

use crate::config::ButtonMap;
use crate::error::DeskError;
use crate::traits::DeskUart;

/// Maps buttons to fixed outbound frames
#[derive(Debug, Clone, Default)]
pub struct ButtonDispatcher {
    buttons: ButtonMap,
}

impl ButtonDispatcher {
    pub fn new(buttons: ButtonMap) -> Self {
        Self { buttons }
    }

    /// Encoded frame for one press of `button`
    pub fn frame_for(&self, button: Button) -> Result<Vec<u8, MAX_FRAME_SIZE>, DeskError> {
        self.buttons
            .get(button)
            .map(|command| command.encode())
            .ok_or(DeskError::UnknownButton(Some(button)))
    }

    /// Send one press of `button`
    pub fn press<U: DeskUart>(&self, uart: &mut U, button: Button) -> Result<(), DeskError> {
        let frame = self.frame_for(button)?;
        uart.write_all(&frame).map_err(|_| DeskError::Uart)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Pressed {}", button.name());

        Ok(())
    }

    /// Send one press of the button named `name`
    pub fn press_named<U: DeskUart>(&self, uart: &mut U, name: &str) -> Result<(), DeskError> {
        let button = Button::from_name(name).ok_or(DeskError::UnknownButton(None))?;
        self.press(uart, button)
    }
}
