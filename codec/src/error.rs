//! Error types for codec operations

use thiserror::Error;

/// Reason a buffer could not be parsed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("invalid varint")]
    InvalidVarint,
    #[error("invalid wire type: {0}")]
    InvalidWireType(u8),
    #[error("invalid field number: {0}")]
    InvalidFieldNumber(u64),
    #[error("invalid length: {0}")]
    InvalidLength(usize),
}

/// Error type for codec operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("parse failed at offset {offset}: {source}")]
    ParseFailed {
        /// Offset of the first byte of the item that failed to parse.
        offset: usize,
        source: ParseError,
    },
    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),
}

impl Error {
    /// Attaches an absolute buffer offset to a [ParseError].
    pub fn parse(offset: usize, source: ParseError) -> Self {
        Self::ParseFailed { offset, source }
    }
}
