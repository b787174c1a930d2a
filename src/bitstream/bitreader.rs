//! BitReader: unpacks a byte stream into single bits or N-bit values.
//!
//! Bits come out most significant first, both within each byte of the source and
//! within each N-bit value returned by `bint`.
//!
//! NOTE: This module can read from any I/O source that supports the read() call. Only one
//! byte is held at a time, so wrap slow sources in a `std::io::BufReader`.
//!

use log::trace;

use super::error::{check_width, BitError, BitResult};
use super::BitSource;

/// Reads bits from an owned byte source.
#[derive(Debug)]
pub struct BitReader<R> {
    /// Handle to the input stream
    source: R,
    /// Last byte fetched. Unread bits sit at the top, already shifted into place.
    current: u8,
    /// Count of unread bits left in `current`, 0..=8.
    remaining: u8,
    /// Number of bytes fetched from the source so far.
    fetched: usize,
}

impl<R: std::io::Read> BitReader<R> {
    /// Creates a new BitReader around an already open source.
    pub fn new(source: R) -> Self {
        Self {
            source,
            current: 0,
            remaining: 0,
            fetched: 0,
        }
    }

    /// Pull the next byte from the source into the one byte buffer.
    fn fetch(&mut self) -> BitResult<()> {
        let mut byte = [0_u8; 1];
        if self.source.read(&mut byte)? == 0 {
            return Err(BitError::EndOfStream);
        }
        self.current = byte[0];
        self.remaining = 8;
        self.fetched += 1;
        trace!("Fetched byte {:0>8b} at {}", byte[0], self.fetched - 1);
        Ok(())
    }

    /// Return the next bit (1 or 0). A new byte is fetched only when the current one is used up.
    pub fn bit(&mut self) -> BitResult<u8> {
        if self.remaining == 0 {
            self.fetch()?;
        }
        let bit = self.current >> 7;
        self.current <<= 1;
        self.remaining -= 1;
        Ok(bit)
    }

    /// Return *true* if the next bit is 1, *false* if 0, consuming the bit.
    pub fn bool_bit(&mut self) -> BitResult<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Return the next n bits (1..=32) as an unsigned value. The first bit read becomes the
    /// most significant bit of the result.
    pub fn bint(&mut self, n: u32) -> BitResult<u32> {
        check_width(n)?;
        let mut result = 0_u32;
        for _ in 0..n {
            result = result << 1 | self.bit()? as u32;
        }
        Ok(result)
    }

    /// Returns the next 8 bits as a byte. This is a convenience function, and calls bint(8).
    pub fn byte(&mut self) -> BitResult<u8> {
        self.bint(8).map(|byte| byte as u8)
    }

    /// Returns the next n bytes. Fails without returning anything if the source runs out first.
    pub fn bytes(&mut self, n: usize) -> BitResult<Vec<u8>> {
        (0..n).map(|_| self.byte()).collect()
    }

    /// True when no partially read byte is buffered.
    pub fn is_aligned(&self) -> bool {
        self.remaining == 0
    }

    /// Debugging function. Report current position as [bytes.bits] consumed.
    pub fn loc(&self) -> String {
        if self.remaining == 0 {
            format!("[{}.0]", self.fetched)
        } else {
            format!("[{}.{}]", self.fetched - 1, 8 - self.remaining)
        }
    }

    /// Gets a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Unwraps this BitReader, returning the source. Any partially read byte is lost.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Releases the source. Nothing is pending on the read side, so this cannot fail.
    pub fn close(self) {
        trace!("Closing reader at {}", self.loc());
    }
}

impl<R: std::io::Read> BitSource for BitReader<R> {
    fn bit(&mut self) -> BitResult<u8> {
        BitReader::bit(self)
    }

    fn bint(&mut self, n: u32) -> BitResult<u32> {
        BitReader::bint(self, n)
    }
}
