//! Error types for the IRC wire library.
//!
//! Parse errors are per-line and recoverable, encode errors reject a single
//! record, and decode errors separate a bad line from a dead source.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors encountered when parsing or mutating a message.
///
/// None of these leave a record in a partially updated state: a failed
/// parse leaves the field unset and a rejected mutation changes nothing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The prefix marker was not followed by any prefix bytes.
    #[error("empty prefix")]
    EmptyPrefix,

    /// No command token could be found on the line.
    #[error("missing command")]
    MissingCommand,

    /// More than [`MAX_PARAMS`](crate::MAX_PARAMS) ordinary parameters.
    #[error("too many parameters")]
    TooManyParameters,
}

/// Errors encountered when serializing a message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// The record has no command; nothing was written.
    #[error("no command")]
    NoCommand,

    /// The record's raw line could not be decomposed.
    #[error("malformed message: {0}")]
    Malformed(#[from] MessageParseError),

    /// The sink rejected the write.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by [`Decoder::decode`](crate::Decoder::decode).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The line source is exhausted.
    #[error("end of stream")]
    EndOfStream,

    /// The line source failed; stop reading from it.
    #[error("line source failed: {0}")]
    Io(#[source] std::io::Error),

    /// The line was read but could not be parsed.
    #[error("invalid message: {0}")]
    Parse(#[from] MessageParseError),
}

impl DecodeError {
    /// Returns `true` if the source has no more lines.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, DecodeError::EndOfStream)
    }

    /// Returns `true` if the read loop may carry on with the next line.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DecodeError::Parse(_))
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io(err)
    }
}

/// Top-level protocol errors, used by the async codec.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A message could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[source] EncodeError),
}

impl From<EncodeError> for ProtocolError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Io(e) => ProtocolError::Io(e),
            other => ProtocolError::Encode(other),
        }
    }
}
