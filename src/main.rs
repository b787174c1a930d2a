//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    process::exit,
};

use bitio::bitstream::BitResult;
use bitio::tools::cli::{bitopts_init, BitOpts, Mode, Output};
use bitio::tools::repack::{copy, dump, pack};

use log::{error, info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode};

fn main() {
    // Log everything here; the -v option narrows it down once the command line is read.
    TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .unwrap_or_else(|e| eprintln!("Unable to start logging: {}", e));

    let result = bitopts_init().and_then(|options| run(&options));

    match result {
        Ok(()) => info!("Done.\n"),
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    }
}

/// Figure out what we need to do and go do it.
fn run(opts: &BitOpts) -> BitResult<()> {
    let file = File::open(&opts.input)?;
    let len = file.metadata()?.len();
    let input = BufReader::new(file);

    let output: Box<dyn Write> = match &opts.output {
        Output::File(name) => Box::new(BufWriter::new(File::create(name)?)),
        Output::Stdout => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match opts.op_mode {
        Mode::Copy => copy(input, len, output, opts.width),
        Mode::Dump => dump(input, len, output, opts.width),
        Mode::Pack => pack(input, output).map(drop),
    }
}
