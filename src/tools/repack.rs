//! File level operations built on the bitstream module: copy, dump and pack.
//!
//! Each one takes any reader/writer pair so it can be driven from files, stdout or memory.

use std::io::{BufRead, Read, Write};

use log::{debug, info, warn};

use crate::bitstream::error::{check_width, raise_invalid_input};
use crate::bitstream::{transfer, BitReader, BitResult, BitWriter};

/// Groups printed per line by dump().
const GROUPS_PER_LINE: usize = 8;

/// A length of zero usually means the input is a pipe or device whose size is unknown.
fn warn_if_empty(len: u64) {
    if len == 0 {
        warn!("Input reports a length of 0 bytes, nothing will be read.");
    }
}

/// Re-pack `len` bytes from `input` into `output`, moving `width` bits per call.
pub fn copy<R: Read, W: Write>(input: R, len: u64, output: W, width: u32) -> BitResult<()> {
    warn_if_empty(len);
    let mut br = BitReader::new(input);
    let mut bw = BitWriter::new(output);
    transfer(&mut br, &mut bw, len * 8, width)?;
    debug!("Reader stopped at {}, writer at {}", br.loc(), bw.loc());
    br.close();
    bw.close()?;
    info!("Copied {} bytes, {} bits per call.", len, width);
    Ok(())
}

/// Print `len` bytes from `input` as MSB-first groups of `width` bits. The last group is short
/// when the bit count does not divide evenly.
pub fn dump<R: Read, W: Write>(input: R, len: u64, mut output: W, width: u32) -> BitResult<()> {
    check_width(width)?;
    warn_if_empty(len);
    let mut br = BitReader::new(input);
    let mut bits = len * 8;
    let mut groups = 0_usize;
    while bits > 0 {
        let n = bits.min(width as u64) as u32;
        let value = br.bint(n)?;
        let sep = if groups % GROUPS_PER_LINE == 0 { "" } else { " " };
        write!(output, "{}{:0>w$b}", sep, value, w = n as usize)?;
        groups += 1;
        if groups % GROUPS_PER_LINE == 0 {
            writeln!(output)?;
        }
        bits -= n as u64;
    }
    if groups % GROUPS_PER_LINE != 0 {
        writeln!(output)?;
    }
    output.flush()?;
    br.close();
    info!("Dumped {} groups of up to {} bits.", groups, width);
    Ok(())
}

/// Pack the ASCII '0' and '1' characters in `input` into bytes. Whitespace is skipped, anything
/// else is rejected. Returns the number of bits packed.
pub fn pack<R: BufRead, W: Write>(input: R, output: W) -> BitResult<u64> {
    let mut bw = BitWriter::new(output);
    let mut bits = 0_u64;
    for byte in input.bytes() {
        match byte? {
            b'0' => bw.bool_bit(false)?,
            b'1' => bw.bool_bit(true)?,
            c if c.is_ascii_whitespace() => continue,
            c => {
                return raise_invalid_input(format!(
                    "unexpected character {:?} after {} bits",
                    c as char, bits
                ))
            }
        }
        bits += 1;
    }
    if !bw.is_aligned() {
        debug!("Last byte holds only {} bits", bits % 8);
    }
    bw.close()?;
    info!("Packed {} bits into {} bytes.", bits, (bits + 7) / 8);
    Ok(bits)
}
