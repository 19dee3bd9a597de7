//! IRC message prefix (source) decomposition.

use crate::message::{HOST_SEPARATOR, USER_SEPARATOR};

/// A borrowed message prefix split into its components.
///
/// `nick!user@host` yields all three parts; a server prefix such as
/// `irc.example.net` is just a name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixRef<'a> {
    /// The whole prefix, without the leading `:`.
    pub raw: &'a [u8],
    /// Nickname or server name.
    pub name: &'a [u8],
    /// Username, after `!`.
    pub user: Option<&'a [u8]>,
    /// Hostname, after `@`.
    pub host: Option<&'a [u8]>,
}

impl<'a> PrefixRef<'a> {
    /// Split a prefix into name, user and host.
    ///
    /// A separator at offset 0 is part of the name, and `@` only ends the
    /// user when it comes after `!`.
    ///
    /// ```
    /// use slirc_wire::PrefixRef;
    ///
    /// let prefix = PrefixRef::parse(b"syrk!kalt@millennium.stealth.net");
    /// assert_eq!(prefix.name, b"syrk");
    /// assert_eq!(prefix.user, Some(&b"kalt"[..]));
    /// assert_eq!(prefix.host, Some(&b"millennium.stealth.net"[..]));
    /// assert!(prefix.is_hostmask());
    /// ```
    pub fn parse(raw: &'a [u8]) -> Self {
        let find = |sep: u8| raw.iter().position(|&b| b == sep).filter(|&i| i > 0);

        let (name, user, host) = match (find(USER_SEPARATOR), find(HOST_SEPARATOR)) {
            (Some(u), Some(h)) if h > u => (&raw[..u], Some(&raw[u + 1..h]), Some(&raw[h + 1..])),
            (Some(u), _) => (&raw[..u], Some(&raw[u + 1..]), None),
            (None, Some(h)) => (&raw[..h], None, Some(&raw[h + 1..])),
            (None, None) => (raw, None, None),
        };

        PrefixRef {
            raw,
            name,
            user,
            host,
        }
    }

    /// Both user and host are present.
    pub fn is_hostmask(&self) -> bool {
        self.user.is_some() && self.host.is_some()
    }

    /// Neither user nor host is present.
    pub fn is_server(&self) -> bool {
        self.user.is_none() && self.host.is_none()
    }
}
