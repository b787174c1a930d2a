//! The tools module provides the command line front end for the bitio library.
//!
//! The tools are:
//! - cli: Command line interface, option parsing and log level setup.
//! - repack: File level copy, dump and pack operations built on the bitstream module.
//!
pub mod cli;
pub mod repack;
