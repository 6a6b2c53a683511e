//! Standing desk handset bus protocol
//!
//! This crate defines the UART protocol (9600 baud, 8N1) spoken between a
//! standing desk's control box and its handset. The handset shows what the
//! control box sends it on a three-digit seven-segment display and reports
//! key presses back.
//!
//! # Protocol Overview
//!
//! All messages use the same binary frame format:
//! ```text
//! ┌───────┬────────┬──────┬─────────┬─────────┬─────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD │ CRC16   │ END │
//! │ 0x9B  │ 1B     │ 1B   │ 0–9B    │ 2B (BE) │0x9D │
//! └───────┴────────┴──────┴─────────┴─────────┴─────┘
//! ```
//!
//! LENGTH counts itself, TYPE, PAYLOAD and the CRC. The CRC is Modbus CRC-16
//! over LENGTH, TYPE and PAYLOAD.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buttons;
pub mod frame;
pub mod messages;
pub mod segment;

pub use buttons::{Button, ButtonCommand};
pub use frame::{
    crc16, decode, Decoded, Frame, FrameError, FrameReader, FRAME_END, FRAME_START,
    MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
pub use messages::{DeskMessage, MessageError};
pub use segment::{DisplayState, SegmentDisplay};
