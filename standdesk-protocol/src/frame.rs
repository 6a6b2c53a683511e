//! Frame encoding and decoding for the desk handset bus.
//!
//! Frame format:
//! - START (1 byte): 0x9B synchronization byte
//! - LENGTH (1 byte): counts LENGTH, TYPE, PAYLOAD and both CRC bytes (4-13)
//! - TYPE (1 byte): message type identifier
//! - PAYLOAD (0-9 bytes): type-specific data
//! - CRC (2 bytes): Modbus CRC-16 over LENGTH, TYPE and PAYLOAD, high byte first
//! - END (1 byte): 0x9D terminator

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0x9B;

/// Frame terminator byte
pub const FRAME_END: u8 = 0x9D;

/// Smallest valid LENGTH field (empty payload)
pub const MIN_LENGTH: u8 = 4;

/// Largest valid LENGTH field
pub const MAX_LENGTH: u8 = 13;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = (MAX_LENGTH - MIN_LENGTH) as usize;

/// Maximum complete frame size (START + LENGTH field span + END)
pub const MAX_FRAME_SIZE: usize = MAX_LENGTH as usize + 2;

/// Bytes a [`FrameReader`] can hold between polls
pub const READ_BUFFER_SIZE: usize = 64;

/// Errors that can occur during frame construction or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Read buffer has no room for more bytes
    ReaderFull,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

/// Modbus CRC-16 (init 0xFFFF, reflected polynomial 0xA001)
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

impl Frame {
    /// Create a new frame with the given message type and payload
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            msg_type,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// Value of the LENGTH field for this frame
    pub fn length(&self) -> u8 {
        MIN_LENGTH + self.payload.len() as u8
    }

    /// Total bytes on the wire
    pub fn size(&self) -> usize {
        self.length() as usize + 2
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let size = self.size();
        if buffer.len() < size {
            return Err(FrameError::BufferTooSmall);
        }

        let crc_index = size - 3;
        buffer[0] = FRAME_START;
        buffer[1] = self.length();
        buffer[2] = self.msg_type;
        buffer[3..crc_index].copy_from_slice(&self.payload);
        let crc = crc16(&buffer[1..crc_index]);
        buffer[crc_index..crc_index + 2].copy_from_slice(&crc.to_be_bytes());
        buffer[size - 1] = FRAME_END;

        Ok(size)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        // A payload of at most MAX_PAYLOAD_SIZE always fits MAX_FRAME_SIZE
        let len = self.encode(&mut buffer).unwrap_or(0);
        let mut vec = Vec::new();
        let _ = vec.extend_from_slice(&buffer[..len]);
        vec
    }
}

/// Outcome of one decode attempt
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoded {
    /// A complete frame with valid terminator and CRC
    Frame(Frame),
    /// The buffer is empty or holds a valid prefix
    NeedMoreData,
    /// Bytes that cannot start a valid frame were dropped
    Malformed {
        /// Number of bytes dropped
        discarded: usize,
    },
}

enum Candidate {
    Complete(Frame, usize),
    Partial,
    Invalid,
}

/// Try to read a frame from a buffer that starts with [`FRAME_START`]
fn candidate(buf: &[u8]) -> Candidate {
    if buf.len() < 2 {
        return Candidate::Partial;
    }

    let length = buf[1];
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Candidate::Invalid;
    }

    let size = length as usize + 2;
    if buf.len() < size {
        return Candidate::Partial;
    }

    if buf[size - 1] != FRAME_END {
        return Candidate::Invalid;
    }

    let crc_index = size - 3;
    let received = u16::from_be_bytes([buf[crc_index], buf[crc_index + 1]]);
    if received != crc16(&buf[1..crc_index]) {
        return Candidate::Invalid;
    }

    match Frame::new(buf[2], &buf[3..crc_index]) {
        Ok(frame) => Candidate::Complete(frame, size),
        Err(_) => Candidate::Invalid,
    }
}

/// Decode the first event in `buf`
///
/// Returns the number of bytes the caller must drop from the front of the
/// buffer together with the outcome. Noise and rejected start markers are
/// skipped one byte at a time; a run of skipped bytes is reported as a single
/// [`Decoded::Malformed`] before the frame that follows it.
pub fn decode(buf: &[u8]) -> (usize, Decoded) {
    let mut discarded = 0;

    while discarded < buf.len() {
        let rest = &buf[discarded..];
        if rest[0] != FRAME_START {
            discarded += 1;
            continue;
        }

        match candidate(rest) {
            Candidate::Complete(frame, size) => {
                if discarded > 0 {
                    return (discarded, Decoded::Malformed { discarded });
                }
                return (size, Decoded::Frame(frame));
            }
            Candidate::Partial => break,
            Candidate::Invalid => discarded += 1,
        }
    }

    if discarded > 0 {
        (discarded, Decoded::Malformed { discarded })
    } else {
        (0, Decoded::NeedMoreData)
    }
}

/// Accumulates UART bytes and yields decode events
///
/// Partial frames stay buffered until the rest arrives on a later poll.
/// Discarded bytes are counted across reads and reported as one
/// [`Decoded::Malformed`] right before the frame that ends the run.
#[derive(Debug, Clone, Default)]
pub struct FrameReader {
    buffer: Vec<u8, READ_BUFFER_SIZE>,
    /// Bytes dropped since the last reported event
    discarded: usize,
}

impl FrameReader {
    /// Create an empty reader
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarded: 0,
        }
    }

    /// Drop all buffered bytes and any unreported discard count
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarded = 0;
    }

    /// Bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes dropped that have not been reported yet
    pub fn pending_discarded(&self) -> usize {
        self.discarded
    }

    /// Free space left in the buffer
    pub fn capacity_left(&self) -> usize {
        READ_BUFFER_SIZE - self.buffer.len()
    }

    /// Append received bytes
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        self.buffer
            .extend_from_slice(bytes)
            .map_err(|_| FrameError::ReaderFull)
    }

    /// Decode the next event, consuming the bytes it covers
    pub fn next_event(&mut self) -> Decoded {
        loop {
            let (consumed, decoded) = decode(&self.buffer);
            match decoded {
                Decoded::Malformed { discarded } => {
                    self.consume(consumed);
                    self.discarded += discarded;
                }
                // The frame stays buffered and is returned by the next call
                Decoded::Frame(_) if self.discarded > 0 => {
                    return Decoded::Malformed {
                        discarded: core::mem::take(&mut self.discarded),
                    };
                }
                other => {
                    self.consume(consumed);
                    return other;
                }
            }
        }
    }

    fn consume(&mut self, count: usize) {
        if count > 0 {
            let len = self.buffer.len();
            self.buffer.copy_within(count..len, 0);
            self.buffer.truncate(len - count);
        }
    }
}
