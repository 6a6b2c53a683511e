//! In-memory UART for host tests

use std::collections::VecDeque;
use std::vec::Vec;

use crate::traits::DeskUart;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockUartError;

/// Scripted UART: bytes fed in are returned by reads, writes are recorded
#[derive(Debug, Default)]
pub struct MockUart {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    /// Largest number of bytes a single read returns
    max_read: Option<usize>,
    fail_writes: bool,
}

impl MockUart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if the control box sent them
    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Bytes not yet read
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Limit how many bytes one read returns
    pub fn set_max_read(&mut self, max: usize) {
        self.max_read = Some(max);
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Everything written so far
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Take and clear the write log
    pub fn take_written(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }
}

impl DeskUart for MockUart {
    type Error = MockUartError;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let limit = self.max_read.unwrap_or(usize::MAX);
        let count = buf.len().min(self.rx.len()).min(limit);
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockUartError);
        }
        self.tx.extend_from_slice(data);
        Ok(())
    }
}
