//! UART abstraction for the handset bus
//!
//! The polling component never waits on the bus: it drains whatever bytes
//! have already arrived and writes key frames in one go.

/// Non-blocking UART connected to the desk control box
pub trait DeskUart {
    /// Error type for UART operations
    type Error;

    /// Copy already-received bytes into `buf`
    ///
    /// Returns the number of bytes copied, 0 when nothing is pending.
    /// Must not wait for more data.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data`
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: DeskUart + ?Sized> DeskUart for &mut T {
    type Error = T::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        T::read_available(self, buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_all(self, data)
    }
}
