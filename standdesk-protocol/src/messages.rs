//! Message types carried on the handset bus
//!
//! - Control box → Handset: display updates and periodic chatter
//! - Handset → Control box: key presses

use crate::buttons::Button;
use crate::frame::Frame;
use crate::segment::SegmentDisplay;

// Message type IDs: Handset → Control box
pub const MSG_KEY: u8 = 0x02;

// Message type IDs: Control box → Handset
pub const MSG_KEEPALIVE: u8 = 0x11;
pub const MSG_DISPLAY: u8 = 0x12;
pub const MSG_STATUS: u8 = 0x15;

/// Errors interpreting a well-formed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Frame type not part of the protocol
    UnknownType(u8),
    /// Payload has the wrong size for its type
    InvalidPayload,
}

/// Structured view of a decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeskMessage {
    /// Display contents
    Display(SegmentDisplay),
    /// Key press seen on the bus; `None` for key codes we do not map
    Key(Option<Button>),
    /// Known frame with no meaning for desk state
    Chatter(u8),
}

impl DeskMessage {
    /// Parse a message from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, MessageError> {
        match frame.msg_type {
            MSG_DISPLAY => {
                if frame.payload.len() < 3 {
                    return Err(MessageError::InvalidPayload);
                }
                Ok(DeskMessage::Display(SegmentDisplay::new([
                    frame.payload[0],
                    frame.payload[1],
                    frame.payload[2],
                ])))
            }
            MSG_KEY => {
                if frame.payload.is_empty() {
                    return Err(MessageError::InvalidPayload);
                }
                Ok(DeskMessage::Key(Button::from_key(&frame.payload)))
            }
            MSG_KEEPALIVE | MSG_STATUS => Ok(DeskMessage::Chatter(frame.msg_type)),
            other => Err(MessageError::UnknownType(other)),
        }
    }

    /// Encode a display update into a frame (for testing or simulation)
    pub fn display_frame(display: &SegmentDisplay) -> Frame {
        // Three bytes always fit the payload
        Frame::new(MSG_DISPLAY, &display.segments).unwrap_or_else(|_| Frame::empty(MSG_DISPLAY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_message() {
        let frame = Frame::new(MSG_DISPLAY, &[0x07, 0xDB, 0x6D]).unwrap();
        let msg = DeskMessage::from_frame(&frame).unwrap();
        match msg {
            DeskMessage::Display(display) => assert_eq!(display.height_cm(), Some(72.5)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_display_short_payload() {
        let frame = Frame::new(MSG_DISPLAY, &[0x07]).unwrap();
        assert_eq!(
            DeskMessage::from_frame(&frame),
            Err(MessageError::InvalidPayload)
        );
    }

    #[test]
    fn test_chatter() {
        let frame = Frame::empty(MSG_KEEPALIVE);
        assert_eq!(
            DeskMessage::from_frame(&frame),
            Ok(DeskMessage::Chatter(MSG_KEEPALIVE))
        );
        let frame = Frame::new(MSG_STATUS, &[0x00]).unwrap();
        assert_eq!(
            DeskMessage::from_frame(&frame),
            Ok(DeskMessage::Chatter(MSG_STATUS))
        );
    }

    #[test]
    fn test_unknown_type() {
        let frame = Frame::empty(0x7E);
        assert_eq!(
            DeskMessage::from_frame(&frame),
            Err(MessageError::UnknownType(0x7E))
        );
    }

    #[test]
    fn test_unmapped_key() {
        let frame = Frame::new(MSG_KEY, &[0x00, 0x00]).unwrap();
        assert_eq!(DeskMessage::from_frame(&frame), Ok(DeskMessage::Key(None)));
    }

    #[test]
    fn test_display_frame_roundtrip() {
        let display = SegmentDisplay::from_height(104.0).unwrap();
        let frame = DeskMessage::display_frame(&display);
        assert_eq!(
            DeskMessage::from_frame(&frame),
            Ok(DeskMessage::Display(display))
        );
    }
}
