use crate::error::MessageParseError;
use crate::prefix::PrefixRef;

use super::record::MessageRecord;
use super::scan::{self, Body};
use super::trim_line_ending;

/// A fully parsed message borrowing from the caller's line.
///
/// Unlike [`MessageRecord`], which parses lazily, a `MessageRef` is
/// decomposed in one pass and never allocates.
///
/// ```
/// use slirc_wire::MessageRef;
///
/// let msg = MessageRef::parse(b":irc.example.net 001 nick :Welcome\r\n")?;
/// assert!(msg.is_server());
/// assert_eq!(msg.command(), b"001");
/// assert_eq!(msg.params(), [&b"nick"[..]]);
/// assert_eq!(msg.trailing(), Some(&b"Welcome"[..]));
/// # Ok::<(), slirc_wire::MessageParseError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageRef<'a> {
    raw: &'a [u8],
    prefix: Option<PrefixRef<'a>>,
    command: &'a [u8],
    body: Body<'a>,
}

impl<'a> MessageRef<'a> {
    pub fn parse(line: &'a [u8]) -> Result<Self, MessageParseError> {
        let raw = trim_line_ending(line);
        let head = scan::split_head(raw)?;
        let body = scan::split_body(head.rest)?;

        Ok(MessageRef {
            raw,
            prefix: head.prefix.map(PrefixRef::parse),
            command: head.command,
            body,
        })
    }

    pub(crate) fn from_parts(
        raw: &'a [u8],
        prefix: Option<PrefixRef<'a>>,
        command: &'a [u8],
        body: Body<'a>,
    ) -> Self {
        MessageRef {
            raw,
            prefix,
            command,
            body,
        }
    }

    /// The line this message was parsed from, without its terminator.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// The whole prefix, without the leading `:`.
    pub fn prefix(&self) -> Option<&'a [u8]> {
        self.prefix.map(|p| p.raw)
    }

    /// The prefix split into its components.
    pub fn source(&self) -> Option<PrefixRef<'a>> {
        self.prefix
    }

    pub fn command(&self) -> &'a [u8] {
        self.command
    }

    pub fn is_command(&self, name: impl AsRef<[u8]>) -> bool {
        self.command.eq_ignore_ascii_case(name.as_ref())
    }

    pub fn params(&self) -> &[&'a [u8]] {
        self.body.params()
    }

    pub fn param(&self, index: usize) -> Option<&'a [u8]> {
        self.body.params().get(index).copied()
    }

    pub fn trailing(&self) -> Option<&'a [u8]> {
        self.body.trailing
    }

    pub fn name(&self) -> Option<&'a [u8]> {
        self.prefix.map(|p| p.name)
    }

    pub fn user(&self) -> Option<&'a [u8]> {
        self.prefix.and_then(|p| p.user)
    }

    pub fn host(&self) -> Option<&'a [u8]> {
        self.prefix.and_then(|p| p.host)
    }

    pub fn is_hostmask(&self) -> bool {
        self.prefix.is_some_and(|p| p.is_hostmask())
    }

    /// `true` for server prefixes and for messages with no prefix at all.
    pub fn is_server(&self) -> bool {
        match self.prefix {
            Some(prefix) => prefix.is_server(),
            None => true,
        }
    }

    /// Copy this message into an owned record.
    pub fn to_record(&self) -> MessageRecord {
        let mut record = MessageRecord::with_capacity(self.raw.len());
        record.bind(self.raw);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_message() {
        let msg = MessageRef::parse(b":syrk!kalt@millennium.stealth.net QUIT :Gone to have lunch").unwrap();
        assert_eq!(msg.prefix(), Some(&b"syrk!kalt@millennium.stealth.net"[..]));
        assert_eq!(msg.name(), Some(&b"syrk"[..]));
        assert_eq!(msg.user(), Some(&b"kalt"[..]));
        assert_eq!(msg.host(), Some(&b"millennium.stealth.net"[..]));
        assert!(msg.is_hostmask());
        assert!(!msg.is_server());
        assert!(msg.is_command("quit"));
        assert!(msg.params().is_empty());
        assert_eq!(msg.trailing(), Some(&b"Gone to have lunch"[..]));
    }

    #[test]
    fn test_no_prefix_is_server() {
        let msg = MessageRef::parse(b"PING :irc.example.net").unwrap();
        assert_eq!(msg.source(), None);
        assert!(msg.is_server());
        assert!(!msg.is_hostmask());
    }

    #[test]
    fn test_param_access() {
        let msg = MessageRef::parse(b"MODE #chan +o nick\r\n").unwrap();
        assert_eq!(msg.raw(), b"MODE #chan +o nick");
        assert_eq!(msg.param(2), Some(&b"nick"[..]));
        assert_eq!(msg.param(3), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            MessageRef::parse(b": PRIVMSG x"),
            Err(MessageParseError::EmptyPrefix)
        );
        assert_eq!(MessageRef::parse(b"\r\n"), Err(MessageParseError::MissingCommand));

        let line = format!("X {}", vec!["p"; 17].join(" "));
        assert_eq!(
            MessageRef::parse(line.as_bytes()),
            Err(MessageParseError::TooManyParameters)
        );
    }

    #[test]
    fn test_to_record() {
        let msg = MessageRef::parse(b":a!b@c PRIVMSG #x :hi there").unwrap();
        let record = msg.to_record();
        assert_eq!(record.raw(), msg.raw());
        assert_eq!(record.command(), Some(msg.command()));
        assert_eq!(record.trailing().unwrap(), msg.trailing());
        assert_eq!(record.as_message_ref().unwrap(), msg);
    }
}
