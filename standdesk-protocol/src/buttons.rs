//! Handset buttons and the key frames that emulate them

use heapless::Vec;

use crate::frame::{Frame, FrameError, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
use crate::messages::MSG_KEY;

/// Logical handset buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Up,
    Down,
    Preset1,
    Preset2,
    Preset3,
    Memory,
    Timer,
}

// Key codes as sent by the stock handset
const KEY_UP: [u8; 2] = [0x01, 0x00];
const KEY_DOWN: [u8; 2] = [0x02, 0x00];
const KEY_PRESET1: [u8; 2] = [0x04, 0x00];
const KEY_PRESET2: [u8; 2] = [0x08, 0x00];
const KEY_PRESET3: [u8; 2] = [0x10, 0x00];
const KEY_MEMORY: [u8; 2] = [0x20, 0x00];
const KEY_TIMER: [u8; 2] = [0x40, 0x00];

impl Button {
    /// Number of buttons
    pub const COUNT: usize = 7;

    /// All buttons in index order
    pub const ALL: [Button; Button::COUNT] = [
        Button::Up,
        Button::Down,
        Button::Preset1,
        Button::Preset2,
        Button::Preset3,
        Button::Memory,
        Button::Timer,
    ];

    /// Stable index in `0..COUNT`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Configuration name of this button
    pub fn name(self) -> &'static str {
        match self {
            Button::Up => "up",
            Button::Down => "down",
            Button::Preset1 => "preset1",
            Button::Preset2 => "preset2",
            Button::Preset3 => "preset3",
            Button::Memory => "memory",
            Button::Timer => "timer",
        }
    }

    /// Look up a button by configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        Button::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// Key payload the stock handset sends for this button
    pub fn default_key(self) -> &'static [u8] {
        match self {
            Button::Up => &KEY_UP,
            Button::Down => &KEY_DOWN,
            Button::Preset1 => &KEY_PRESET1,
            Button::Preset2 => &KEY_PRESET2,
            Button::Preset3 => &KEY_PRESET3,
            Button::Memory => &KEY_MEMORY,
            Button::Timer => &KEY_TIMER,
        }
    }

    /// Button whose default key matches `payload`
    pub fn from_key(payload: &[u8]) -> Option<Self> {
        Button::ALL
            .iter()
            .copied()
            .find(|b| b.default_key() == payload)
    }
}

/// A button bound to the fixed key payload it sends
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonCommand {
    pub button: Button,
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl ButtonCommand {
    /// Bind a button to a custom key payload
    pub fn new(button: Button, payload: &[u8]) -> Result<Self, FrameError> {
        let mut vec = Vec::new();
        vec.extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self {
            button,
            payload: vec,
        })
    }

    /// Bind a button to the stock handset key code
    pub fn with_default_key(button: Button) -> Self {
        let mut payload = Vec::new();
        // Stock keys are two bytes
        let _ = payload.extend_from_slice(button.default_key());
        Self { button, payload }
    }

    /// Frame carrying this key press
    pub fn to_frame(&self) -> Frame {
        Frame {
            msg_type: MSG_KEY,
            payload: self.payload.clone(),
        }
    }

    /// Bytes written to the UART for one press
    pub fn encode(&self) -> Vec<u8, MAX_FRAME_SIZE> {
        self.to_frame().encode_to_vec()
    }
}
