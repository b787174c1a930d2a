//! Bit level reading and writing on top of byte streams.
//!
//! Provides a BitReader and a BitWriter that move 1 to 32 bits per call over anything
//! implementing `std::io::Read` or `std::io::Write`, most significant bit first.
//!
//! Basic usage:
//!
//! ```
//! use bitio::bitstream::{BitReader, BitWriter};
//!
//! let mut bw = BitWriter::new(Vec::<u8>::new());
//! bw.bint(14, 0b01001110010111).unwrap();
//! let bytes = bw.into_inner().unwrap();
//! assert_eq!(bytes, [0b01001110, 0b01011100]);
//!
//! let mut br = BitReader::new(bytes.as_slice());
//! assert_eq!(br.bint(14).unwrap(), 0b01001110010111);
//! ```
//!
//! The `bitio` binary wraps the same types in a small file tool:
//!
//! `$> bitio dump test.bin -w 5`
//!
pub mod bitstream;
pub mod tools;
