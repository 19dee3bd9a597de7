//! IRC message records and their parser.
//!
//! [`MessageRecord`] is the owning, reusable message type used by the
//! [`Decoder`](crate::Decoder) and [`Encoder`](crate::Encoder).
//! [`MessageRef`] is a fully parsed, zero-copy view over a caller's slice.

mod borrowed;
mod params;
mod record;
pub(crate) mod scan;
mod span;

pub use self::borrowed::MessageRef;
pub use self::params::{Params, ParamsIter};
pub use self::record::{MessageRecord, ParseStage};

use std::fmt;

/// Maximum number of ordinary (non-trailing) parameters in a message.
pub const MAX_PARAMS: usize = 16;

/// Marks the start of a prefix at the beginning of a line.
pub const PREFIX_MARKER: u8 = b':';
/// Marks the start of the trailing parameter.
pub const TRAILING_MARKER: u8 = b':';
/// Separates the name from the user in a prefix.
pub const USER_SEPARATOR: u8 = b'!';
/// Separates the host from the rest of a prefix.
pub const HOST_SEPARATOR: u8 = b'@';
/// Field separator.
pub const SPACE: u8 = b' ';
/// Line terminator written after every encoded message.
pub const CRLF: &[u8] = b"\r\n";

/// Strip a trailing `\n`, `\r\n` or lone `\r`.
pub(crate) fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Debug adapter printing bytes as an escaped string literal.
pub(crate) struct Escaped<'a>(pub(crate) &'a [u8]);

impl fmt::Debug for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending(b"PING\r\n"), b"PING");
        assert_eq!(trim_line_ending(b"PING\n"), b"PING");
        assert_eq!(trim_line_ending(b"PING\r"), b"PING");
        assert_eq!(trim_line_ending(b"PING"), b"PING");
        assert_eq!(trim_line_ending(b"PRIVMSG #a :end  \r\n"), b"PRIVMSG #a :end  ");
    }

    #[test]
    fn test_escaped_debug() {
        assert_eq!(format!("{:?}", Escaped(b"\x01ACTION\x01")), "\"\\x01ACTION\\x01\"");
    }
}
