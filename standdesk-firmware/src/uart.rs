//! Adapter from embedded-io UARTs to [`DeskUart`]

use embedded_io::{Read, ReadReady, Write};

use standdesk_core::DeskUart;

/// Wraps a buffered UART so reads only return what is already received
pub struct IoUart<T> {
    inner: T,
}

impl<T> IoUart<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Read + ReadReady + Write> DeskUart for IoUart<T> {
    type Error = T::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.inner.read_ready()? {
            return Ok(0);
        }
        // Data is pending, so this returns without waiting
        self.inner.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        Write::write_all(&mut self.inner, data)?;
        self.inner.flush()
    }
}
