//! Errors reported by the bitstream readers and writers.

/// Result type used throughout the bitstream module.
pub type BitResult<T> = Result<T, BitError>;

#[derive(thiserror::Error, Debug)]
pub enum BitError {
    /// Bit count outside the 1..=32 range accepted by the N-bit calls.
    #[error("Requested {requested} bits, but only 1 to 32 bits can be moved per call.")]
    InvalidArgument { requested: u32 },

    /// The source ran dry while a bit was still needed.
    #[error("Unexpected end of stream.")]
    EndOfStream,

    /// Input that cannot be turned into bits (used by the command line tools).
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Anything reported by the underlying byte stream, passed through untouched.
    #[error("Stream failure: {0}")]
    Stream(#[from] std::io::Error),
}

pub(crate) fn raise_invalid_argument<T>(requested: u32) -> BitResult<T> {
    Err(BitError::InvalidArgument { requested })
}

pub(crate) fn raise_invalid_input<T>(reason: impl Into<String>) -> BitResult<T> {
    Err(BitError::InvalidInput {
        reason: reason.into(),
    })
}

/// Checks that `n` is a legal bit count for a single N-bit call.
pub(crate) fn check_width(n: u32) -> BitResult<()> {
    if !(1..=32).contains(&n) {
        return raise_invalid_argument(n);
    }
    Ok(())
}
