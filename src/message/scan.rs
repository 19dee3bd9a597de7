//! Nom-based scanners for the IRC line grammar.
//!
//! ```text
//! message  := [ ':' prefix SP ] command [ params ] [ SP ':' trailing ]
//! ```
//!
//! Every scanner returns subslices of its input; nothing is copied.

use nom::{
    branch::alt,
    bytes::complete::{take_till, take_while, take_while1},
    character::complete::char,
    combinator::{map, opt, rest},
    sequence::preceded,
    IResult,
};

use super::{MAX_PARAMS, PREFIX_MARKER, SPACE, TRAILING_MARKER};
use crate::error::MessageParseError;

fn is_space(b: u8) -> bool {
    b == SPACE
}

/// Prefix bytes after the marker, up to the first space.
fn prefix(input: &[u8]) -> IResult<&[u8], &[u8]> {
    preceded(char(PREFIX_MARKER as char), take_till(is_space))(input)
}

fn spaces(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while(is_space)(input)
}

fn word(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_till(is_space)(input)
}

/// The prefix and command of a line, and everything after the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Head<'a> {
    pub(crate) prefix: Option<&'a [u8]>,
    pub(crate) command: &'a [u8],
    /// Bytes after the separator that bounds the command; empty at end of line.
    pub(crate) rest: &'a [u8],
}

/// Bound the prefix and command of `line`.
pub(crate) fn split_head(line: &[u8]) -> Result<Head<'_>, MessageParseError> {
    let (input, prefix) =
        opt(prefix)(line).map_err(|_: nom::Err<_>| MessageParseError::EmptyPrefix)?;

    // The prefix must have content and be followed by a separator.
    if let Some(p) = prefix {
        if p.is_empty() || input.is_empty() {
            return Err(MessageParseError::EmptyPrefix);
        }
    }

    let (input, _) = spaces(input).map_err(|_| MessageParseError::MissingCommand)?;
    let (rest, command) = word(input).map_err(|_| MessageParseError::MissingCommand)?;
    if command.is_empty() {
        return Err(MessageParseError::MissingCommand);
    }

    Ok(Head {
        prefix,
        command,
        rest: rest.strip_prefix(&[SPACE]).unwrap_or(rest),
    })
}

enum Token<'a> {
    Middle(&'a [u8]),
    Trailing(&'a [u8]),
}

/// One parameter token; a token starting with `:` swallows the rest of the line.
fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (input, _) = spaces(input)?;
    alt((
        map(preceded(char(TRAILING_MARKER as char), rest), Token::Trailing),
        map(take_while1(|b: u8| !is_space(b)), Token::Middle),
    ))(input)
}

/// Parameters and trailing parameter of one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Body<'a> {
    params: [&'a [u8]; MAX_PARAMS],
    len: usize,
    pub(crate) trailing: Option<&'a [u8]>,
}

impl<'a> Body<'a> {
    pub(crate) fn params(&self) -> &[&'a [u8]] {
        &self.params[..self.len]
    }

    pub(crate) fn push(&mut self, param: &'a [u8]) -> Result<(), MessageParseError> {
        let slot = self
            .params
            .get_mut(self.len)
            .ok_or(MessageParseError::TooManyParameters)?;
        *slot = param;
        self.len += 1;
        Ok(())
    }
}

/// Split everything after the command into parameters and trailing.
pub(crate) fn split_body(mut input: &[u8]) -> Result<Body<'_>, MessageParseError> {
    let mut body = Body::default();
    while let Ok((remaining, token)) = token(input) {
        match token {
            Token::Middle(param) => body.push(param)?,
            Token::Trailing(trailing) => {
                body.trailing = Some(trailing);
                break;
            }
        }
        input = remaining;
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod head {
        use super::*;

        #[test]
        fn test_command_only() {
            let head = split_head(b"PING").unwrap();
            assert_eq!(head.prefix, None);
            assert_eq!(head.command, b"PING");
            assert!(head.rest.is_empty());
        }

        #[test]
        fn test_prefix_and_command() {
            let head = split_head(b":nick!user@host PRIVMSG #chan :hi").unwrap();
            assert_eq!(head.prefix, Some(&b"nick!user@host"[..]));
            assert_eq!(head.command, b"PRIVMSG");
            assert_eq!(head.rest, b"#chan :hi");
        }

        #[test]
        fn test_empty_prefix() {
            assert_eq!(
                split_head(b": PRIVMSG test :x"),
                Err(MessageParseError::EmptyPrefix)
            );
            assert_eq!(
                split_head(b":  PRIVMSG test"),
                Err(MessageParseError::EmptyPrefix)
            );
            assert_eq!(split_head(b":"), Err(MessageParseError::EmptyPrefix));
        }

        #[test]
        fn test_prefix_without_separator() {
            assert_eq!(split_head(b":server"), Err(MessageParseError::EmptyPrefix));
        }

        #[test]
        fn test_missing_command() {
            assert_eq!(split_head(b""), Err(MessageParseError::MissingCommand));
            assert_eq!(split_head(b"   "), Err(MessageParseError::MissingCommand));
            assert_eq!(
                split_head(b":server "),
                Err(MessageParseError::MissingCommand)
            );
        }

        #[test]
        fn test_repeated_spaces_before_command() {
            let head = split_head(b":server   NOTICE * :x").unwrap();
            assert_eq!(head.prefix, Some(&b"server"[..]));
            assert_eq!(head.command, b"NOTICE");
        }
    }

    mod body {
        use super::*;

        #[test]
        fn test_params_and_trailing() {
            let body = split_body(b"* LS :multi-prefix sasl").unwrap();
            assert_eq!(body.params(), [&b"*"[..], &b"LS"[..]]);
            assert_eq!(body.trailing, Some(&b"multi-prefix sasl"[..]));
        }

        #[test]
        fn test_empty_trailing() {
            let body = split_body(b"* LIST :").unwrap();
            assert_eq!(body.params(), [&b"*"[..], &b"LIST"[..]]);
            assert_eq!(body.trailing, Some(&b""[..]));
        }

        #[test]
        fn test_colon_inside_middle_is_literal() {
            let body = split_body(b"a:b c").unwrap();
            assert_eq!(body.params(), [&b"a:b"[..], &b"c"[..]]);
            assert_eq!(body.trailing, None);
        }

        #[test]
        fn test_trailing_keeps_colons() {
            let body = split_body(b"#chan ::-)").unwrap();
            assert_eq!(body.params(), [&b"#chan"[..]]);
            assert_eq!(body.trailing, Some(&b":-)"[..]));
        }

        #[test]
        fn test_repeated_spaces_skipped() {
            let body = split_body(b"$@  param   :Trailing").unwrap();
            assert_eq!(body.params(), [&b"$@"[..], &b"param"[..]]);
            assert_eq!(body.trailing, Some(&b"Trailing"[..]));
        }

        #[test]
        fn test_sixteen_params_allowed() {
            let line = (1..=16).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
            let body = split_body(line.as_bytes()).unwrap();
            assert_eq!(body.params().len(), 16);
            assert_eq!(body.params()[15], b"16");
        }

        #[test]
        fn test_seventeen_params_rejected() {
            let line = (1..=17).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
            assert_eq!(
                split_body(line.as_bytes()),
                Err(MessageParseError::TooManyParameters)
            );
        }

        #[test]
        fn test_trailing_after_sixteen_params() {
            let mut line = (1..=16).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
            line.push_str(" :last one");
            let body = split_body(line.as_bytes()).unwrap();
            assert_eq!(body.params().len(), 16);
            assert_eq!(body.trailing, Some(&b"last one"[..]));
        }
    }
}
