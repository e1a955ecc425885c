//! Byte-link abstraction: any UART-like channel.
//!
//! Concrete implementations:
//! - ESP-IDF UART driver (TP-UART transceiver, MH-Z19 sensor)
//! - in-memory loopbacks in tests
//!
//! The TP-UART bus and the CO2 driver are generic over `ByteLink`, so the
//! protocol logic never touches a UART register.

/// Byte-oriented serial channel.
pub trait ByteLink {
    /// Error type for this link.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read up to `buf.len()` bytes, waiting at most `timeout_ms` for the
    /// first byte.  Links without a wait primitive fall back to [`read`].
    ///
    /// [`read`]: ByteLink::read
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        let _ = timeout_ms;
        self.read(buf)
    }

    /// Write `data` to the link.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}

/// A null link that discards all writes and never reads.
/// Used when the transceiver is absent (bench bring-up).
pub struct NullLink;

impl ByteLink for NullLink {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn available(&self) -> bool {
        false
    }
}
