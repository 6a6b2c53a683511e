//! Seven-segment display decoding
//!
//! The handset mirrors its three-digit display on the bus. Each byte drives
//! one digit; bit 7 is the decimal point after that digit:
//!
//! ```text
//!   0 0 0
//! 5       1
//! 5       1
//!   6 6 6
//! 4       2
//! 4       2
//!   3 3 3    7
//! ```

const SYMBOL_MASK: u8 = 0b0111_1111;
const DOT_BIT: u8 = 0b1000_0000;

const OFF: u8 = 0b0000_0000;
const DASH: u8 = 0b0100_0000;
const SYMBOL_F: u8 = 0b0111_0001;
const SYMBOL_N: u8 = 0b0011_0111;
const COLON: u8 = 0b0000_1001;
// "S" and "O" share their patterns with 5 and 0
const SYMBOL_S: u8 = DIGITS[5];
const SYMBOL_O: u8 = DIGITS[0];

const DIGITS: [u8; 10] = [
    0b0011_1111,
    0b0000_0110,
    0b0101_1011,
    0b0100_1111,
    0b0110_0110,
    0b0110_1101,
    0b0111_1101,
    0b0000_0111,
    0b0111_1111,
    0b0110_1111,
];

/// Decode a single segment byte to a digit, ignoring the decimal point
pub fn segment_to_digit(segment: u8) -> Option<u8> {
    let symbol = segment & SYMBOL_MASK;
    DIGITS.iter().position(|&d| d == symbol).map(|d| d as u8)
}

/// Encode a digit (0-9) as a segment byte
pub fn digit_to_segment(digit: u8) -> Option<u8> {
    DIGITS.get(digit as usize).copied()
}

/// What the handset display is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayState {
    /// Pattern not recognised
    #[default]
    Unknown,
    /// Display blank
    Off,
    /// Height readout
    Height,
    /// "S-" memory prompt
    Memory,
    /// " ON" alarm enabled
    TimerOn,
    /// ":NN" alarm duration with colon
    TimerDurationOn,
    /// ":  " colon blinking, digits blank
    TimerDurationOff,
    /// " NN" alarm duration without colon
    TimerDurationOnly,
    /// "OFF" alarm disabled
    TimerOff,
}

impl DisplayState {
    /// Number of display states, for per-state bookkeeping arrays
    pub const COUNT: usize = 9;

    /// Stable index of this state in `0..COUNT`
    pub fn index(self) -> usize {
        self as usize
    }

    /// True for the two states that carry alarm minutes
    pub fn shows_duration(self) -> bool {
        matches!(
            self,
            DisplayState::TimerDurationOn | DisplayState::TimerDurationOnly
        )
    }

    /// Upper-case name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayState::Unknown => "UNKNOWN",
            DisplayState::Off => "OFF",
            DisplayState::Height => "HEIGHT",
            DisplayState::Memory => "MEMORY",
            DisplayState::TimerOn => "TIMER_ON",
            DisplayState::TimerDurationOn => "TIMER_DURATION_ON",
            DisplayState::TimerDurationOff => "TIMER_DURATION_OFF",
            DisplayState::TimerDurationOnly => "TIMER_DURATION_ONLY",
            DisplayState::TimerOff => "TIMER_OFF",
        }
    }
}

/// Raw contents of the three display digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentDisplay {
    pub segments: [u8; 3],
}

impl SegmentDisplay {
    pub const fn new(segments: [u8; 3]) -> Self {
        Self { segments }
    }

    /// Build a display showing a height, e.g. 72.5 or 110
    ///
    /// Values below 100 get one decimal, values from 100 up are whole
    /// centimetres. Returns `None` outside 0.0..=999.0.
    pub fn from_height(height_cm: f32) -> Option<Self> {
        if !(0.0..=999.0).contains(&height_cm) {
            return None;
        }

        if height_cm < 100.0 {
            let tenths = (height_cm * 10.0 + 0.5) as u16;
            let mut segments = [
                digit_to_segment((tenths / 100) as u8)?,
                digit_to_segment((tenths / 10 % 10) as u8)?,
                digit_to_segment((tenths % 10) as u8)?,
            ];
            segments[1] |= DOT_BIT;
            Some(Self { segments })
        } else {
            let whole = (height_cm + 0.5) as u16;
            Some(Self {
                segments: [
                    digit_to_segment((whole / 100) as u8)?,
                    digit_to_segment((whole / 10 % 10) as u8)?,
                    digit_to_segment((whole % 10) as u8)?,
                ],
            })
        }
    }

    /// Build a display showing alarm minutes with or without the colon
    pub fn from_alarm_minutes(minutes: u8, colon: bool) -> Option<Self> {
        if minutes > 99 {
            return None;
        }
        Some(Self {
            segments: [
                if colon { COLON } else { OFF },
                digit_to_segment(minutes / 10)?,
                digit_to_segment(minutes % 10)?,
            ],
        })
    }

    /// Blank display
    pub const fn off() -> Self {
        Self::new([OFF, OFF, OFF])
    }

    /// "S-" memory prompt
    pub const fn memory() -> Self {
        Self::new([SYMBOL_S, DASH, OFF])
    }

    /// " ON"
    pub const fn timer_on() -> Self {
        Self::new([OFF, SYMBOL_O, SYMBOL_N])
    }

    /// "OFF"
    pub const fn timer_off() -> Self {
        Self::new([SYMBOL_O, SYMBOL_F, SYMBOL_F])
    }

    /// ":  " (colon only)
    pub const fn duration_blank() -> Self {
        Self::new([COLON, OFF, OFF])
    }

    /// Classify the pattern on the display
    pub fn state(&self) -> DisplayState {
        let [s1, s2, s3] = self.segments;
        let digits = (
            segment_to_digit(s1),
            segment_to_digit(s2),
            segment_to_digit(s3),
        );

        if self.segments == [OFF, OFF, OFF] {
            return DisplayState::Off;
        }
        if self.segments == [SYMBOL_S, DASH, OFF] {
            return DisplayState::Memory;
        }
        if self.segments == [OFF, SYMBOL_O, SYMBOL_N] {
            return DisplayState::TimerOn;
        }
        if self.segments == [SYMBOL_O, SYMBOL_F, SYMBOL_F] {
            return DisplayState::TimerOff;
        }
        if self.segments == [COLON, OFF, OFF] {
            return DisplayState::TimerDurationOff;
        }

        match digits {
            (_, Some(_), Some(_)) if s1 == COLON => DisplayState::TimerDurationOn,
            (_, Some(_), Some(_)) if s1 == OFF => DisplayState::TimerDurationOnly,
            (Some(_), Some(_), Some(_)) => DisplayState::Height,
            _ => DisplayState::Unknown,
        }
    }

    /// Height in centimetres, if the display shows one
    ///
    /// A decimal point on the middle digit means the reading is in tenths.
    pub fn height_cm(&self) -> Option<f32> {
        if self.state() != DisplayState::Height {
            return None;
        }

        let [s1, s2, s3] = self.segments;
        let value = segment_to_digit(s1)? as u16 * 100
            + segment_to_digit(s2)? as u16 * 10
            + segment_to_digit(s3)? as u16;

        if s2 & DOT_BIT == DOT_BIT {
            Some(value as f32 / 10.0)
        } else {
            Some(value as f32)
        }
    }

    /// Alarm minutes, if the display shows a duration
    pub fn alarm_minutes(&self) -> Option<u8> {
        if !self.state().shows_duration() {
            return None;
        }
        let [_, s2, s3] = self.segments;
        Some(segment_to_digit(s2)? * 10 + segment_to_digit(s3)?)
    }
}
