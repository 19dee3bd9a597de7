//! Zero-copy encoding for IRC messages.
//!
//! This module provides the [`WireEncode`] trait for writing IRC messages
//! directly to any [`Write`] implementor (sockets, `Vec<u8>`, `BytesMut`
//! writers) without intermediate `String` allocations.
//!
//! # Example
//!
//! ```
//! use slirc_wire::encode::WireEncode;
//! use slirc_wire::MessageRecord;
//!
//! let mut msg = MessageRecord::new();
//! msg.set_command("PRIVMSG");
//! msg.set_parameters(&["#channel"])?;
//! msg.set_trailing("Hello!");
//!
//! let mut buf = Vec::new();
//! msg.encode(&mut buf)?;
//! assert_eq!(&buf, b"PRIVMSG #channel :Hello!\r\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::Write;

use crate::error::EncodeError;
use crate::message::{MessageRecord, MessageRef, CRLF, PREFIX_MARKER, SPACE, TRAILING_MARKER};

/// A trait for encoding IRC messages directly to a byte stream.
///
/// # Implementors
///
/// - [`MessageRecord`] - Owned, reusable message
/// - [`MessageRef`] - Borrowed message
pub trait WireEncode {
    /// Encode this message, terminated by `\r\n`, to the given writer.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Errors
    ///
    /// [`EncodeError::NoCommand`] if there is no command to write, in which
    /// case nothing is written. Otherwise the writer's I/O error.
    fn encode<W: Write>(&self, writer: &mut W) -> Result<usize, EncodeError>;

    /// Encode this message to a new `Vec<u8>`.
    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(512);
        self.encode(&mut buf)?;
        Ok(buf)
    }
}

/// The parts of one outgoing line.
struct Line<'a, P> {
    prefix: Option<&'a [u8]>,
    command: Option<&'a [u8]>,
    params: P,
    trailing: Option<&'a [u8]>,
}

impl<'a, P> Line<'a, P>
where
    P: IntoIterator<Item = &'a [u8]>,
{
    fn write<W: Write>(self, w: &mut W) -> Result<usize, EncodeError> {
        let command = self
            .command
            .filter(|c| !c.is_empty())
            .ok_or(EncodeError::NoCommand)?;

        let mut written = 0;
        let mut put = |bytes: &[u8]| -> std::io::Result<()> {
            w.write_all(bytes)?;
            written += bytes.len();
            Ok(())
        };

        if let Some(prefix) = self.prefix.filter(|p| !p.is_empty()) {
            put(&[PREFIX_MARKER])?;
            put(prefix)?;
            put(&[SPACE])?;
        }

        put(command)?;

        for param in self.params {
            put(&[SPACE])?;
            put(param)?;
        }

        if let Some(trailing) = self.trailing {
            put(&[SPACE, TRAILING_MARKER])?;
            put(trailing)?;
        }

        put(CRLF)?;
        Ok(written)
    }
}

impl WireEncode for MessageRecord {
    /// Fields are taken from the record as it stands, so a record whose raw
    /// line cannot be decomposed fails with [`EncodeError::Malformed`].
    fn encode<W: Write>(&self, w: &mut W) -> Result<usize, EncodeError> {
        let command = self.command();
        if command.is_none() {
            return Err(EncodeError::NoCommand);
        }

        Line {
            prefix: self.prefix(),
            command,
            params: self.params()?,
            trailing: self.trailing()?,
        }
        .write(w)
    }
}

impl WireEncode for MessageRef<'_> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<usize, EncodeError> {
        Line {
            prefix: self.prefix(),
            command: Some(self.command()),
            params: self.params().iter().copied(),
            trailing: self.trailing(),
        }
        .write(w)
    }
}

impl<T: WireEncode + ?Sized> WireEncode for &T {
    fn encode<W: Write>(&self, w: &mut W) -> Result<usize, EncodeError> {
        (**self).encode(w)
    }
}
