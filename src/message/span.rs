use std::ops::Range;

use nom::Offset;

/// A byte range into a record's backing buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub(crate) fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Locate `sub`, a subslice of `base`, as a span of `base`.
    pub(crate) fn of(base: &[u8], sub: &[u8]) -> Self {
        let start = <[u8] as Offset>::offset(base, sub);
        Span::new(start, start + sub.len())
    }

    pub(crate) fn start(self) -> usize {
        self.start
    }

    pub(crate) fn range(self) -> Range<usize> {
        self.start..self.end
    }

    pub(crate) fn len(self) -> usize {
        self.end - self.start
    }

    pub(crate) fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// `inner` lies entirely within this span.
    pub(crate) fn contains(self, inner: Span) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    /// The same length, moved to begin at `start`.
    pub(crate) fn moved_to(self, start: usize) -> Self {
        Span::new(start, start + self.len())
    }

    /// The bytes covered by this span, or an empty slice if out of bounds.
    pub(crate) fn slice(self, buf: &[u8]) -> &[u8] {
        buf.get(self.range()).unwrap_or_default()
    }
}
