//! The owning, reusable message record.

use std::cell::OnceCell;
use std::cmp::Reverse;
use std::fmt;
use std::io;
use std::str::FromStr;

use tracing::trace;

use super::borrowed::MessageRef;
use super::params::Params;
use super::scan::{self, Body, Head};
use super::span::Span;
use super::{trim_line_ending, Escaped, HOST_SEPARATOR, MAX_PARAMS, USER_SEPARATOR};
use crate::error::MessageParseError;
use crate::prefix::PrefixRef;

/// How far a record's raw line has been decomposed.
///
/// Each accessor advances only as far as it needs: [`command`] bounds the
/// head, [`params`] and [`trailing`] decompose the rest of the line.
///
/// [`command`]: MessageRecord::command
/// [`params`]: MessageRecord::params
/// [`trailing`]: MessageRecord::trailing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// Nothing has been derived yet, or the head failed to parse.
    Unparsed,
    /// Prefix and command are bounded.
    CommandBounded,
    /// Parameters and trailing are split as well.
    FullyDecomposed,
}

#[derive(Debug, Clone, Copy)]
struct HeadSpans {
    prefix: Option<Span>,
    command: Option<Span>,
    /// Offset into the raw line just past the command.
    cursor: usize,
}

impl HeadSpans {
    /// A head that claims nothing from the raw line.
    fn detached(line_len: usize) -> Self {
        HeadSpans {
            prefix: None,
            command: None,
            cursor: line_len,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BodySpans {
    params: [Span; MAX_PARAMS],
    len: usize,
    trailing: Option<Span>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SourceSpans {
    name: Option<Span>,
    user: Option<Span>,
    host: Option<Span>,
}

/// Every cached span that points past the raw line, into bytes a setter
/// stashed.
fn stashed_spans<'a>(
    head: &'a mut OnceCell<Result<HeadSpans, MessageParseError>>,
    body: &'a mut OnceCell<Result<BodySpans, MessageParseError>>,
    source: &'a mut OnceCell<SourceSpans>,
    line_len: usize,
) -> impl Iterator<Item = &'a mut Span> {
    let head = head
        .get_mut()
        .and_then(|head| head.as_mut().ok())
        .into_iter()
        .flat_map(|HeadSpans { prefix, command, .. }| {
            prefix.iter_mut().chain(command.iter_mut())
        });
    let body = body
        .get_mut()
        .and_then(|body| body.as_mut().ok())
        .into_iter()
        .flat_map(|BodySpans { params, len, trailing }| {
            params.iter_mut().take(*len).chain(trailing.iter_mut())
        });
    let source = source
        .get_mut()
        .into_iter()
        .flat_map(|SourceSpans { name, user, host }| {
            name.iter_mut().chain(user.iter_mut()).chain(host.iter_mut())
        });

    head.chain(body)
        .chain(source)
        .filter(move |span| span.start() >= line_len)
}

/// One IRC message: a raw line plus the fields derived from it.
///
/// A record owns a single backing buffer. Incoming lines are stored in it
/// once and every parsed field is a view into that line, so parsing never
/// copies. Setters used to build outgoing messages append the caller's
/// bytes to the same buffer, reclaiming replaced values once they outweigh
/// the live ones. [`reset`](Self::reset) empties the buffer but
/// keeps its capacity, so a read loop can reuse one record for every line.
///
/// Parsing is lazy and memoized. Each stage (head, body, prefix
/// components) is scanned at most once per line, on first use.
///
/// ```
/// use slirc_wire::MessageRecord;
///
/// let record = MessageRecord::parse(":nick!user@host PRIVMSG #chan :hello :world")?;
/// assert_eq!(record.command(), Some(&b"PRIVMSG"[..]));
/// assert_eq!(record.params()?.to_vec(), [&b"#chan"[..]]);
/// assert_eq!(record.trailing()?, Some(&b"hello :world"[..]));
/// assert_eq!(record.user(), Some(&b"user"[..]));
/// # Ok::<(), slirc_wire::MessageParseError>(())
/// ```
#[derive(Clone, Default)]
pub struct MessageRecord {
    buf: Vec<u8>,
    line_len: usize,
    head: OnceCell<Result<HeadSpans, MessageParseError>>,
    body: OnceCell<Result<BodySpans, MessageParseError>>,
    source: OnceCell<SourceSpans>,
}

impl MessageRecord {
    /// Create an empty record, ready for setters or [`bind`](Self::bind).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record whose buffer holds `capacity` bytes up front.
    pub fn with_capacity(capacity: usize) -> Self {
        MessageRecord {
            buf: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Create a record bound to `line`. Nothing is parsed yet.
    pub fn from_line(line: impl AsRef<[u8]>) -> Self {
        let mut record = Self::new();
        record.bind(line);
        record
    }

    /// Bind `line` and bound its command.
    pub fn parse(line: impl AsRef<[u8]>) -> Result<Self, MessageParseError> {
        let record = Self::from_line(line);
        record.peek_command()?;
        Ok(record)
    }

    /// Reset the record and store `line` as its raw bytes.
    ///
    /// A trailing line terminator is stripped.
    pub fn bind(&mut self, line: impl AsRef<[u8]>) {
        self.reset();
        self.buf.extend_from_slice(trim_line_ending(line.as_ref()));
        self.line_len = self.buf.len();
    }

    /// Reset the record, then let `fill` append one line to the buffer.
    pub(crate) fn fill_line<F>(&mut self, fill: F) -> io::Result<usize>
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<usize>,
    {
        self.reset();
        match fill(&mut self.buf) {
            Ok(read) => {
                self.line_len = trim_line_ending(&self.buf).len();
                Ok(read)
            }
            Err(e) => {
                self.buf.clear();
                Err(e)
            }
        }
    }

    /// Clear every field and parse stage, keeping the buffer's capacity.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.line_len = 0;
        self.head.take();
        self.body.take();
        self.source.take();
    }

    /// The bound line, without its terminator. Empty for records built
    /// only through setters.
    pub fn raw(&self) -> &[u8] {
        &self.buf[..self.line_len]
    }

    /// Current parse progress.
    pub fn stage(&self) -> ParseStage {
        match (self.head.get(), self.body.get()) {
            (Some(Ok(_)), Some(Ok(_))) => ParseStage::FullyDecomposed,
            (Some(Ok(_)), _) => ParseStage::CommandBounded,
            _ => ParseStage::Unparsed,
        }
    }

    // Stage transitions. Each stage is scanned in exactly one place and
    // cached until `reset`.

    fn head(&self) -> Result<&HeadSpans, MessageParseError> {
        self.head
            .get_or_init(|| self.scan_head())
            .as_ref()
            .map_err(|e| *e)
    }

    fn scan_head(&self) -> Result<HeadSpans, MessageParseError> {
        let line = self.raw();
        let Head {
            prefix,
            command,
            rest,
        } = scan::split_head(line)?;

        Ok(HeadSpans {
            prefix: prefix.map(|p| Span::of(line, p)),
            command: Some(Span::of(line, command)),
            cursor: Span::of(line, rest).start(),
        })
    }

    fn body(&self) -> Result<&BodySpans, MessageParseError> {
        self.body
            .get_or_init(|| self.scan_body())
            .as_ref()
            .map_err(|e| *e)
    }

    fn scan_body(&self) -> Result<BodySpans, MessageParseError> {
        // Nothing after a malformed head is parsed.
        let Ok(head) = self.head() else {
            return Ok(BodySpans::default());
        };

        let line = self.raw();
        let body = scan::split_body(line.get(head.cursor..).unwrap_or_default())?;

        let mut spans = BodySpans {
            trailing: body.trailing.map(|t| Span::of(line, t)),
            ..BodySpans::default()
        };
        for (slot, param) in spans.params.iter_mut().zip(body.params()) {
            *slot = Span::of(line, param);
        }
        spans.len = body.params().len();
        Ok(spans)
    }

    fn source(&self) -> &SourceSpans {
        self.source.get_or_init(|| self.scan_source())
    }

    fn scan_source(&self) -> SourceSpans {
        let Some(prefix) = self.prefix() else {
            return SourceSpans::default();
        };

        let parts = PrefixRef::parse(prefix);
        SourceSpans {
            name: Some(Span::of(&self.buf, parts.name)),
            user: parts.user.map(|u| Span::of(&self.buf, u)),
            host: parts.host.map(|h| Span::of(&self.buf, h)),
        }
    }

    /// The body as it stands, scanning it if that has not happened yet.
    fn current_body(&self) -> Result<BodySpans, MessageParseError> {
        match self.body.get() {
            Some(body) => *body,
            None => self.scan_body(),
        }
    }

    fn update_head(&mut self, update: impl FnOnce(&mut HeadSpans)) {
        let mut head = match self.head.take() {
            Some(Ok(head)) => head,
            Some(Err(_)) => HeadSpans::detached(self.line_len),
            None => self
                .scan_head()
                .unwrap_or_else(|_| HeadSpans::detached(self.line_len)),
        };
        update(&mut head);
        self.head = OnceCell::from(Ok(head));
    }

    fn slice(&self, span: Span) -> &[u8] {
        span.slice(&self.buf)
    }

    /// Append `bytes` to the backing buffer.
    fn stash(&mut self, bytes: &[u8]) -> Span {
        let start = self.buf.len();
        self.buf.extend_from_slice(bytes);
        Span::new(start, self.buf.len())
    }

    /// Re-append bytes already in the buffer.
    fn restash(&mut self, span: Span) -> Span {
        let start = self.buf.len();
        self.buf.extend_from_within(span.range());
        Span::new(start, self.buf.len())
    }

    /// Drop stashed bytes that no field refers to any more, once they
    /// outweigh the ones still in use.
    ///
    /// Must run after a setter has stored its new spans. The raw line is
    /// never moved.
    fn compact(&mut self) {
        let MessageRecord {
            buf,
            line_len,
            head,
            body,
            source,
        } = self;
        let line_len = *line_len;

        let live: usize = stashed_spans(head, body, source, line_len)
            .map(|span| span.len())
            .sum();
        if buf.len() - line_len <= 2 * live {
            return;
        }

        // Enclosing spans sort before the spans inside them, so prefix
        // components stay inside the prefix they were split from.
        let mut spans: Vec<&mut Span> = stashed_spans(head, body, source, line_len).collect();
        spans.sort_unstable_by_key(|span| (span.start(), Reverse(span.len())));

        let mut compacted = Vec::with_capacity(buf.capacity());
        compacted.extend_from_slice(&buf[..line_len]);
        let mut outer: Option<(Span, usize)> = None;
        for span in spans {
            let start = match outer.filter(|(region, _)| region.contains(*span)) {
                Some((region, at)) => at + span.start() - region.start(),
                None => {
                    let at = compacted.len();
                    compacted.extend_from_slice(span.slice(&buf[..]));
                    outer = Some((*span, at));
                    at
                }
            };
            *span = span.moved_to(start);
        }

        trace!(
            before = buf.len(),
            after = compacted.len(),
            "compacted record buffer"
        );
        *buf = compacted;
    }

    /// Bound the prefix and command.
    ///
    /// This is the fast path for dispatch: parameters are left alone.
    /// Calling it again returns the cached outcome.
    pub fn peek_command(&self) -> Result<(), MessageParseError> {
        match self.head()?.command {
            Some(_) => Ok(()),
            None => Err(MessageParseError::MissingCommand),
        }
    }

    /// Split the parameters and trailing parameter.
    pub fn parse_params(&self) -> Result<(), MessageParseError> {
        self.body().map(|_| ())
    }

    /// Split the prefix into name, user and host.
    pub fn parse_prefix(&self) {
        self.source();
    }

    /// Run every parse stage.
    pub fn parse_all(&self) -> Result<(), MessageParseError> {
        self.peek_command()?;
        self.parse_prefix();
        self.parse_params()
    }

    /// Offset into [`raw`](Self::raw) just past the command token.
    pub fn cursor(&self) -> Option<usize> {
        self.head().ok().map(|head| head.cursor)
    }

    /// The command, bounding the head on first use.
    pub fn command(&self) -> Option<&[u8]> {
        let span = self.head().ok()?.command?;
        Some(self.slice(span))
    }

    /// Compare the command with `name`, ignoring ASCII case.
    pub fn is_command(&self, name: impl AsRef<[u8]>) -> bool {
        self.command()
            .is_some_and(|command| command.eq_ignore_ascii_case(name.as_ref()))
    }

    /// The prefix, without the leading `:`.
    pub fn prefix(&self) -> Option<&[u8]> {
        let span = self.head().ok()?.prefix?;
        Some(self.slice(span))
    }

    /// The prefix name: everything before the user or host separator.
    pub fn name(&self) -> Option<&[u8]> {
        self.source().name.map(|span| self.slice(span))
    }

    /// The prefix user, between `!` and `@`.
    pub fn user(&self) -> Option<&[u8]> {
        self.source().user.map(|span| self.slice(span))
    }

    /// The prefix host, after `@`.
    pub fn host(&self) -> Option<&[u8]> {
        self.source().host.map(|span| self.slice(span))
    }

    /// The prefix carries both a user and a host.
    pub fn is_hostmask(&self) -> bool {
        let source = self.source();
        source.user.is_some() && source.host.is_some()
    }

    /// The prefix carries neither user nor host, or there is no prefix.
    pub fn is_server(&self) -> bool {
        let source = self.source();
        source.user.is_none() && source.host.is_none()
    }

    /// The ordinary parameters, in order.
    ///
    /// # Errors
    ///
    /// [`MessageParseError::TooManyParameters`] if the raw line carries
    /// more than [`MAX_PARAMS`] of them.
    pub fn params(&self) -> Result<Params<'_>, MessageParseError> {
        let body = self.body()?;
        Ok(Params::new(&self.buf, &body.params[..body.len]))
    }

    /// The parameter at `index`, if the body parses and has one there.
    pub fn param(&self, index: usize) -> Option<&[u8]> {
        self.params().ok()?.get(index)
    }

    /// The trailing parameter, without its leading `:`.
    pub fn trailing(&self) -> Result<Option<&[u8]>, MessageParseError> {
        Ok(self.body()?.trailing.map(|span| self.slice(span)))
    }

    /// A fully decomposed borrowed view of this record.
    pub fn as_message_ref(&self) -> Result<MessageRef<'_>, MessageParseError> {
        self.peek_command()?;
        let command = self.command().ok_or(MessageParseError::MissingCommand)?;

        let mut body = Body::default();
        for param in self.params()? {
            body.push(param)?;
        }
        body.trailing = self.trailing()?;

        let prefix = self.prefix().map(|raw| PrefixRef {
            raw,
            name: self.name().unwrap_or_default(),
            user: self.user(),
            host: self.host(),
        });

        Ok(MessageRef::from_parts(self.raw(), prefix, command, body))
    }

    /// Replace the command.
    pub fn set_command(&mut self, command: impl AsRef<[u8]>) {
        let span = self.stash(command.as_ref());
        self.update_head(|head| head.command = Some(span));
        self.compact();
    }

    /// Replace the whole prefix; its components are split again on demand.
    pub fn set_prefix(&mut self, prefix: impl AsRef<[u8]>) {
        let span = self.stash(prefix.as_ref());
        self.update_head(|head| head.prefix = (!span.is_empty()).then_some(span));
        self.source.take();
        self.compact();
    }

    /// Replace the prefix name, rebuilding the prefix around it.
    pub fn set_name(&mut self, name: impl AsRef<[u8]>) {
        let mut source = *self.source();
        source.name = Some(self.stash(name.as_ref()));
        self.rebuild_prefix(source);
    }

    /// Replace the prefix user, rebuilding the prefix around it.
    ///
    /// Without a name the prefix starts with the `!` separator. Such a
    /// prefix encodes as-is, but parsing it back yields a name holding the
    /// separator and no user, since a separator at the start of a prefix is
    /// part of the name. Set a name as well when the line will be re-read.
    pub fn set_user(&mut self, user: impl AsRef<[u8]>) {
        let mut source = *self.source();
        source.user = Some(self.stash(user.as_ref()));
        self.rebuild_prefix(source);
    }

    /// Replace the prefix host, rebuilding the prefix around it.
    ///
    /// Like [`set_user`](Self::set_user), a host set without a name gives a
    /// prefix such as `@host` that parses back as a name.
    pub fn set_host(&mut self, host: impl AsRef<[u8]>) {
        let mut source = *self.source();
        source.host = Some(self.stash(host.as_ref()));
        self.rebuild_prefix(source);
    }

    /// Write `name!user@host` from the given components and point the
    /// prefix and its components at the result.
    fn rebuild_prefix(&mut self, parts: SourceSpans) {
        let start = self.buf.len();
        let mut source = SourceSpans::default();

        if let Some(name) = parts.name {
            source.name = Some(self.restash(name));
        }
        if let Some(user) = parts.user {
            self.buf.push(USER_SEPARATOR);
            source.user = Some(self.restash(user));
        }
        if let Some(host) = parts.host {
            self.buf.push(HOST_SEPARATOR);
            source.host = Some(self.restash(host));
        }

        let prefix = Span::new(start, self.buf.len());
        self.update_head(|head| head.prefix = (!prefix.is_empty()).then_some(prefix));
        self.source = OnceCell::from(source);
        self.compact();
    }

    /// Replace every ordinary parameter.
    ///
    /// Fails without touching the record if `params` holds more than
    /// [`MAX_PARAMS`] entries. The trailing parameter is kept.
    pub fn set_parameters<P: AsRef<[u8]>>(&mut self, params: &[P]) -> Result<(), MessageParseError> {
        if params.len() > MAX_PARAMS {
            return Err(MessageParseError::TooManyParameters);
        }

        let mut body = self.current_body().unwrap_or_default();
        for (slot, param) in body.params.iter_mut().zip(params) {
            *slot = self.stash(param.as_ref());
        }
        body.len = params.len();
        self.body = OnceCell::from(Ok(body));
        self.compact();
        Ok(())
    }

    /// Add one parameter after the existing ones.
    ///
    /// Fails without touching the record once [`MAX_PARAMS`] are present,
    /// or if the existing parameters cannot be parsed.
    pub fn append_parameter(&mut self, param: impl AsRef<[u8]>) -> Result<(), MessageParseError> {
        let mut body = self.current_body()?;
        if body.len == MAX_PARAMS {
            return Err(MessageParseError::TooManyParameters);
        }

        body.params[body.len] = self.stash(param.as_ref());
        body.len += 1;
        self.body = OnceCell::from(Ok(body));
        self.compact();
        Ok(())
    }

    /// Replace the trailing parameter. An empty one is still written.
    pub fn set_trailing(&mut self, trailing: impl AsRef<[u8]>) {
        let mut body = self.current_body().unwrap_or_default();
        body.trailing = Some(self.stash(trailing.as_ref()));
        self.body = OnceCell::from(Ok(body));
        self.compact();
    }

    /// Drop the trailing parameter.
    pub fn clear_trailing(&mut self) {
        let mut body = self.current_body().unwrap_or_default();
        body.trailing = None;
        self.body = OnceCell::from(Ok(body));
    }
}

impl FromStr for MessageRecord {
    type Err = MessageParseError;

    /// Bind `s` and run every parse stage.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let record = Self::from_line(s);
        record.parse_all()?;
        Ok(record)
    }
}

impl fmt::Debug for MessageRecord {
    /// Shows what has been parsed so far without parsing anything more.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.head.get().and_then(|head| head.as_ref().ok());
        let body = self.body.get().and_then(|body| body.as_ref().ok());
        let field = |span: Option<Span>| span.map(|s| Escaped(self.slice(s)));

        let params: Vec<_> = body
            .map(|b| b.params[..b.len].iter().map(|s| Escaped(self.slice(*s))).collect())
            .unwrap_or_default();

        f.debug_struct("MessageRecord")
            .field("command", &field(head.and_then(|h| h.command)))
            .field("params", &params)
            .field("prefix", &field(head.and_then(|h| h.prefix)))
            .field("trailing", &field(body.and_then(|b| b.trailing)))
            .field("stage", &self.stage())
            .finish()
    }
}
