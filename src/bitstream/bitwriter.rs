//! BitWriter: packs single bits or N-bit values into bytes for an output stream.
//!
//! Bytes are pushed to the sink as soon as their eighth bit arrives, most significant bit
//! first. The trailing partial byte is padded with zeros in its low bits and written when the
//! writer is closed (or dropped).

use log::{debug, trace, warn};

use super::error::{check_width, BitResult};
use super::BitSink;

/// Writes bits to an owned byte sink.
#[derive(Debug)]
pub struct BitWriter<W: std::io::Write> {
    /// Handle to the output stream. Only `None` once the writer has been closed or unwrapped.
    sink: Option<W>,
    /// Bits waiting to become a byte, most recent bit in the lowest position.
    pending: u8,
    /// Count of valid bits in `pending`, 0..=7 between calls.
    buffered: u8,
    /// Number of bytes pushed to the sink so far.
    emitted: usize,
}

impl<W: std::io::Write> BitWriter<W> {
    /// Creates a new BitWriter around an already open sink.
    pub fn new(sink: W) -> Self {
        Self {
            sink: Some(sink),
            pending: 0,
            buffered: 0,
            emitted: 0,
        }
    }

    /// Internal byte write common to all the bit calls.
    fn emit(&mut self, byte: u8) -> BitResult<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.write_all(&[byte])?;
            trace!("Emitted byte {:0>8b} at {}", byte, self.emitted);
            self.emitted += 1;
        }
        Ok(())
    }

    /// Put a single bit (the low bit of `bit`) on the stream.
    pub fn bit(&mut self, bit: u8) -> BitResult<()> {
        self.pending = self.pending << 1 | (bit & 1);
        self.buffered += 1;
        if self.buffered == 8 {
            // The counter resets even when the write below fails.
            self.buffered = 0;
            self.emit(self.pending)?;
        }
        Ok(())
    }

    /// Put 1 on the stream for *true*, 0 for *false*.
    pub fn bool_bit(&mut self, bit: bool) -> BitResult<()> {
        self.bit(bit as u8)
    }

    /// Put the low n bits (1..=32) of `value` on the stream, most significant first. Higher bits
    /// of `value` are ignored.
    pub fn bint(&mut self, n: u32, value: u32) -> BitResult<()> {
        check_width(n)?;
        let mut value = value << (32 - n);
        for _ in 0..n {
            self.bit((value >> 31) as u8)?;
            value <<= 1;
        }
        Ok(())
    }

    /// Put a byte on the stream. This is a convenience function, and calls bint(8).
    pub fn byte(&mut self, byte: u8) -> BitResult<()> {
        self.bint(8, byte as u32)
    }

    /// Put a slice of bytes on the stream, one byte at a time.
    pub fn bytes(&mut self, bytes: &[u8]) -> BitResult<()> {
        bytes.iter().try_for_each(|&byte| self.byte(byte))
    }

    /// True when no partial byte is waiting to be written.
    pub fn is_aligned(&self) -> bool {
        self.buffered == 0
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.emitted, self.buffered)
    }

    /// Gets a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        match self.sink.as_ref() {
            Some(sink) => sink,
            None => unreachable!("BitWriter sink taken while the writer is alive"),
        }
    }

    /// Writes the remaining bits (1-7) from the buffer, padding with 0s in the least
    /// significant bits. Does nothing when the buffer is empty.
    fn flush_pending(&mut self) -> BitResult<()> {
        if self.buffered == 0 {
            return Ok(());
        }
        let padding = 8 - self.buffered;
        let byte = self.pending << padding;
        self.buffered = 0;
        self.pending = 0;
        debug!("Padding final byte with {} zero bits", padding);
        self.emit(byte)
    }

    /// Pads and writes any partial byte, flushes the sink, then hands it back.
    pub fn into_inner(mut self) -> BitResult<W> {
        let flushed = self.flush_pending();
        // The sink is taken even on failure so Drop does not try a second time.
        let mut sink = match self.sink.take() {
            Some(sink) => sink,
            None => unreachable!("BitWriter sink taken before into_inner"),
        };
        flushed?;
        sink.flush()?;
        Ok(sink)
    }

    /// Pads and writes any partial byte, then flushes and releases the sink.
    pub fn close(self) -> BitResult<()> {
        debug!("Closing writer at {}", self.loc());
        self.into_inner().map(drop)
    }
}

impl<W: std::io::Write> BitSink for BitWriter<W> {
    fn bit(&mut self, bit: u8) -> BitResult<()> {
        BitWriter::bit(self, bit)
    }

    fn bint(&mut self, n: u32, value: u32) -> BitResult<()> {
        BitWriter::bint(self, n, value)
    }
}

/// Writes out the partial byte when a writer goes out of scope without being closed. Errors
/// can only be logged here; call close() to see them.
impl<W: std::io::Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        if self.sink.is_none() {
            return;
        }
        if let Err(e) = self.flush_pending() {
            warn!("Unable to write final byte of dropped BitWriter: {}", e);
        }
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.flush() {
                warn!("Unable to flush dropped BitWriter: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::BitWriter;
    use crate::bitstream::BitError;
    use std::cell::Cell;
    use std::io::Write;
    use std::rc::Rc;

    /// Sink that records every write call it sees.
    #[derive(Debug, Default)]
    struct Recorder {
        writes: Vec<Vec<u8>>,
        flushes: usize,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    /// Sink that must never be touched.
    struct Untouchable;

    impl Write for Untouchable {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            panic!("sink was written")
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Sink that refuses every byte.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Sink that counts its writes and how often it is dropped, optionally refusing every byte.
    struct Tracked {
        writes: Rc<Cell<u32>>,
        drops: Rc<Cell<u32>>,
        fail: bool,
    }

    impl Write for Tracked {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes.set(self.writes.get() + 1);
            if self.fail {
                return Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"));
            }
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    fn tracked(fail: bool) -> (Tracked, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let writes = Rc::new(Cell::new(0));
        let drops = Rc::new(Cell::new(0));
        let sink = Tracked {
            writes: Rc::clone(&writes),
            drops: Rc::clone(&drops),
            fail,
        };
        (sink, writes, drops)
    }

    #[test]
    fn bit_test() {
        let mut vec: Vec<u8> = vec![];
        {
            let mut bw = BitWriter::new(&mut vec);
            for bit in [0, 0, 1, 0, 1, 0, 1, 0] {
                bw.bit(bit).unwrap();
            }
            assert!(bw.is_aligned());
            bw.close().unwrap();
        }
        assert_eq!(vec, [0x2a]);
    }

    #[test]
    fn bit_uses_low_bit_only_test() {
        let mut bw = BitWriter::new(Vec::<u8>::new());
        bw.bit(0b10).unwrap();
        bw.bit(0xff).unwrap();
        assert_eq!(bw.into_inner().unwrap(), [0b0100_0000]);
    }

    #[test]
    fn short_bint_test() {
        let mut bw = BitWriter::new(Recorder::default());
        bw.bint(5, 0b10011).unwrap();
        let sink = bw.into_inner().unwrap();
        assert_eq!(sink.writes, vec![vec![0b10011000]]);
    }

    #[test]
    fn fourteen_bits_test() {
        let mut bw = BitWriter::new(Recorder::default());
        bw.bint(14, 0b01001110010111).unwrap();
        let sink = bw.into_inner().unwrap();
        assert_eq!(sink.writes, vec![vec![0b01001110], vec![0b01011100]]);
    }

    #[test]
    fn bint_ignores_high_bits_test() {
        let mut bw = BitWriter::new(Vec::<u8>::new());
        bw.bint(4, 0xfffffff5).unwrap();
        bw.bint(4, 0x0a).unwrap();
        assert_eq!(bw.into_inner().unwrap(), [0x5a]);
    }

    #[test]
    fn bint_u32_test() {
        let mut bw = BitWriter::new(Vec::<u8>::new());
        bw.bint(32, 2147003647).unwrap();
        assert_eq!(bw.into_inner().unwrap(), 2147003647_u32.to_be_bytes());
    }

    #[test]
    fn one_write_every_eight_bits_test() {
        let mut bw = BitWriter::new(Recorder::default());
        bw.bint(32, 123).unwrap();
        let sink = bw.into_inner().unwrap();
        assert_eq!(sink.writes.len(), 4);
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn emit_count_law_test() {
        // With b bits already buffered, writing n bits and closing emits ceil((b + n) / 8) bytes.
        for before in 0..8_u32 {
            for n in 1..=32_u32 {
                let mut bw = BitWriter::new(Recorder::default());
                if before > 0 {
                    bw.bint(before, 0).unwrap();
                }
                assert_eq!(bw.get_ref().writes.len(), 0);
                bw.bint(n, u32::MAX).unwrap();
                assert_eq!(
                    bw.get_ref().writes.len(),
                    ((before + n) / 8) as usize,
                    "before {} n {}",
                    before,
                    n
                );
                let sink = bw.into_inner().unwrap();
                assert_eq!(sink.writes.len(), ((before + n + 7) / 8) as usize);
            }
        }
    }

    #[test]
    fn too_many_bits_test() {
        let mut bw = BitWriter::new(Untouchable);
        assert!(matches!(
            bw.bint(33, 1),
            Err(BitError::InvalidArgument { requested: 33 })
        ));
        assert!(matches!(
            bw.bint(0, 1),
            Err(BitError::InvalidArgument { requested: 0 })
        ));
        assert!(bw.is_aligned());
        bw.close().unwrap();
    }

    #[test]
    fn close_empty_test() {
        let bw = BitWriter::new(Recorder::default());
        let sink = bw.into_inner().unwrap();
        assert!(sink.writes.is_empty());
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn close_pads_test() {
        let mut bw = BitWriter::new(Recorder::default());
        bw.bint(5, 0b10111).unwrap();
        assert_eq!(bw.loc(), "[0.5]");
        let sink = bw.into_inner().unwrap();
        assert_eq!(sink.writes, vec![vec![0b10111000]]);
    }

    #[test]
    fn close_aligned_test() {
        let mut vec: Vec<u8> = vec![];
        {
            let mut bw = BitWriter::new(&mut vec);
            bw.bytes(b"ab").unwrap();
            bw.close().unwrap();
        }
        assert_eq!(vec, b"ab");
    }

    #[test]
    fn drop_flushes_test() {
        let mut vec: Vec<u8> = vec![];
        {
            let mut bw = BitWriter::new(&mut vec);
            bw.bit(1).unwrap();
            bw.bool_bit(false).unwrap();
            bw.bool_bit(true).unwrap();
        }
        assert_eq!(vec, [0b1010_0000]);
    }

    #[test]
    fn stream_failure_test() {
        let mut bw = BitWriter::new(Broken);
        bw.bint(7, 0).unwrap();
        match bw.bit(1) {
            Err(BitError::Stream(e)) => assert_eq!(e.kind(), std::io::ErrorKind::WriteZero),
            other => panic!("unexpected result {:?}", other),
        }
        // Nothing is left pending, so close has no byte to retry.
        assert!(bw.close().is_ok());
    }

    #[test]
    fn close_reports_flush_failure_test() {
        let mut bw = BitWriter::new(Broken);
        bw.bint(3, 0b101).unwrap();
        assert!(matches!(bw.close(), Err(BitError::Stream(_))));
    }

    #[test]
    fn close_releases_sink_once_test() {
        let (sink, writes, drops) = tracked(false);
        let mut bw = BitWriter::new(sink);
        bw.bint(3, 0b101).unwrap();
        assert_eq!(drops.get(), 0);
        assert!(bw.close().is_ok());
        assert_eq!(writes.get(), 1);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn close_releases_failing_sink_once_test() {
        let (sink, writes, drops) = tracked(true);
        let mut bw = BitWriter::new(sink);
        bw.bint(3, 0b101).unwrap();
        assert!(matches!(bw.close(), Err(BitError::Stream(_))));
        // The padded byte was attempted exactly once, and the sink is gone anyway.
        assert_eq!(writes.get(), 1);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn drop_releases_sink_once_test() {
        let (sink, writes, drops) = tracked(false);
        {
            let mut bw = BitWriter::new(sink);
            bw.bint(3, 0b101).unwrap();
        }
        assert_eq!(writes.get(), 1);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn loc_test() {
        let mut bw = BitWriter::new(Vec::<u8>::new());
        bw.bytes(b"Hello").unwrap();
        bw.bit(1).unwrap();
        assert_eq!(bw.loc(), "[5.1]");
        assert!(!bw.is_aligned());
    }

    #[test]
    fn write_trait_sink_test() {
        let mut out = std::io::Cursor::new(Vec::<u8>::new());
        {
            let mut bw = BitWriter::new(&mut out);
            bw.bint(12, 0xabc).unwrap();
            bw.close().unwrap();
        }
        out.flush().unwrap();
        assert_eq!(out.into_inner(), [0xab, 0xc0]);
    }
}
