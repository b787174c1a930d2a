//! Command line interface for the bitio tool. Uses the external CLAP crate.

use std::{fmt::Display, fmt::Formatter};

use clap::{Parser, Subcommand};
use log::{info, warn};

use crate::bitstream::error::{check_width, raise_invalid_input, BitResult};

/// Copy, Dump, Pack
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Copy,
    Dump,
    Pack,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    File(String),
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::File(name) => write!(f, "file {}", name),
            Output::Stdout => write!(f, "stdout"),
        }
    }
}

/// Everything the user can set, after validation.
#[derive(Debug)]
pub struct BitOpts {
    /// Operation to perform
    pub op_mode: Mode,
    /// Name of the file to read for input
    pub input: String,
    /// Location where output is sent
    pub output: Output,
    /// Bits moved per read/write call (1..=32)
    pub width: u32,
    /// Log level selected with -v
    pub verbosity: log::LevelFilter,
}

/// Command Line Interpretation
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Bit level file tools",
    long_about = "
    Reads and writes files one bit group at a time. Bits are taken most significant
    first from every byte, and any trailing partial byte is padded with zeros."
)]
pub struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Sets verbosity. -v0 is silent, -v5 traces every byte
    #[clap(short = 'v', global = true, default_value_t = 3)]
    v: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-pack a file through the bit reader and writer, WIDTH bits at a time
    Copy {
        /// File to read
        input: String,
        /// File to write (stdout when absent)
        #[clap(short = 'o', long)]
        output: Option<String>,
        /// Bits per call, 1 to 32
        #[clap(short = 'w', long, default_value_t = 8)]
        width: u32,
    },
    /// Print a file as groups of WIDTH bits
    Dump {
        /// File to read
        input: String,
        /// Bits per group, 1 to 32
        #[clap(short = 'w', long, default_value_t = 8)]
        width: u32,
    },
    /// Pack a text file of 0 and 1 characters into bytes
    Pack {
        /// File to read
        input: String,
        /// File to write (stdout when absent)
        #[clap(short = 'o', long)]
        output: Option<String>,
    },
}

/// Map the -v count onto a log level
fn level(v: u8) -> log::LevelFilter {
    match v {
        0 => log::LevelFilter::Off,
        1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

impl BitOpts {
    /// Put command line information from CLAP into our internal structure, checking the width.
    pub fn from_args(args: Args) -> BitResult<Self> {
        let verbosity = level(args.v);
        let (op_mode, input, output, width) = match args.command {
            Command::Copy {
                input,
                output,
                width,
            } => (Mode::Copy, input, output, width),
            Command::Dump { input, width } => (Mode::Dump, input, None, width),
            Command::Pack { input, output } => (Mode::Pack, input, output, 1),
        };
        check_width(width)?;
        if let Some(name) = &output {
            if same_file(&input, name) {
                return raise_invalid_input(format!("output {} would overwrite the input", name));
            }
        }
        Ok(Self {
            op_mode,
            input,
            output: output.map_or(Output::Stdout, Output::File),
            width,
            verbosity,
        })
    }
}

/// True when both names point at the same file. An output that does not exist yet can only
/// match by name.
fn same_file(input: &str, output: &str) -> bool {
    if input == output {
        return true;
    }
    match (std::fs::canonicalize(input), std::fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Parse the command line, set the log level and report what we are about to do.
pub fn bitopts_init() -> BitResult<BitOpts> {
    let opts = BitOpts::from_args(Args::parse())?;

    log::set_max_level(opts.verbosity);

    info!("---- Bitio Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Getting input from the file {}", opts.input);
    match &opts.output {
        Output::File(_) => info!("Sending output to {}", opts.output),
        Output::Stdout => warn!("Sending output to {}", opts.output),
    }
    if opts.op_mode != Mode::Pack {
        info!("Width set to {} bits", opts.width);
    }
    info!("---- Bitio Initialization End ----\n");
    Ok(opts)
}
