use std::fmt;
use std::iter::FusedIterator;
use std::slice;

use super::span::Span;
use super::Escaped;

/// The ordinary parameters of a [`MessageRecord`](super::MessageRecord).
///
/// Borrows from the record; the trailing parameter is not included.
#[derive(Clone, Copy)]
pub struct Params<'a> {
    buf: &'a [u8],
    spans: &'a [Span],
}

impl<'a> Params<'a> {
    pub(crate) fn new(buf: &'a [u8], spans: &'a [Span]) -> Self {
        Params { buf, spans }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The parameter at `index`, counting from zero.
    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        self.spans.get(index).map(|span| span.slice(self.buf))
    }

    pub fn first(&self) -> Option<&'a [u8]> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&'a [u8]> {
        self.spans.last().map(|span| span.slice(self.buf))
    }

    pub fn iter(&self) -> ParamsIter<'a> {
        ParamsIter {
            buf: self.buf,
            spans: self.spans.iter(),
        }
    }

    /// Collect the parameters into a `Vec` of borrowed slices.
    pub fn to_vec(&self) -> Vec<&'a [u8]> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for Params<'a> {
    type Item = &'a [u8];
    type IntoIter = ParamsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Params<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(Escaped)).finish()
    }
}

/// Iterator over [`Params`].
#[derive(Clone)]
pub struct ParamsIter<'a> {
    buf: &'a [u8],
    spans: slice::Iter<'a, Span>,
}

impl<'a> Iterator for ParamsIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.spans.next().map(|span| span.slice(self.buf))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl DoubleEndedIterator for ParamsIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.spans.next_back().map(|span| span.slice(self.buf))
    }
}

impl ExactSizeIterator for ParamsIter<'_> {}

impl FusedIterator for ParamsIter<'_> {}
