//! The bitstream module provides bit level I/O over any byte stream.
//!
//! `std::io::{Read, Write}` only move whole bytes. BitReader and BitWriter sit on top of a
//! byte stream they own and let the caller move anywhere from 1 to 32 bits per call, regardless
//! of byte boundaries.
//!
//! Bit order is most significant bit first, both inside each byte on the stream and inside each
//! N-bit value. Anything written with `BitWriter::bint(n, v)` comes back as `v` from
//! `BitReader::bint(n)`.
//!
//! Each reader and writer holds at most one partial byte. For performance, hand them a
//! `BufReader`/`BufWriter` rather than a raw file.
//!
pub mod bitreader;
pub mod bitwriter;
pub mod error;

pub use bitreader::BitReader;
pub use bitwriter::BitWriter;
pub use error::{BitError, BitResult};

/// Anything bits can be pulled from.
pub trait BitSource {
    /// Next bit, 1 or 0.
    fn bit(&mut self) -> BitResult<u8>;
    /// Next n bits (1..=32), first bit read in the most significant position.
    fn bint(&mut self, n: u32) -> BitResult<u32>;
}

/// Anything bits can be pushed to.
pub trait BitSink {
    /// Push the low bit of `bit`.
    fn bit(&mut self, bit: u8) -> BitResult<()>;
    /// Push the low n bits (1..=32) of `value`, most significant first.
    fn bint(&mut self, n: u32, value: u32) -> BitResult<()>;
}

/// Move `bits` bits from `source` to `sink`, `width` bits (1..=32) per call. The last call
/// moves whatever is left when `bits` is not a multiple of `width`.
pub fn transfer<S, K>(source: &mut S, sink: &mut K, mut bits: u64, width: u32) -> BitResult<()>
where
    S: BitSource + ?Sized,
    K: BitSink + ?Sized,
{
    error::check_width(width)?;
    while bits > 0 {
        let n = bits.min(width as u64) as u32;
        let value = source.bint(n)?;
        sink.bint(n, value)?;
        bits -= n as u64;
    }
    Ok(())
}
