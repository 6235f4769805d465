//! Byte spans in source text.

use text_size::{TextRange, TextSize};

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` in some text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Inclusive start offset.
    pub start: ByteOffset,
    /// Exclusive end offset.
    pub end: ByteOffset,
}

impl Span {
    /// Creates a span from start and end offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` offsets, as produced by string searching
    /// and lexers.
    ///
    /// Offsets are truncated to `u32`; pypp sources are far below 4 GiB.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        Self::new(TextSize::from(start as u32), TextSize::from(end as u32))
    }

    /// Length of the span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if the span covers no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `offset` lies inside the span.
    #[inline]
    pub fn contains(&self, offset: ByteOffset) -> bool {
        self.start <= offset && offset < self.end
    }

    /// The text this span covers in `source`.
    ///
    /// Returns `None` when the span is out of bounds or splits a character.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(usize::from(self.start)..usize::from(self.end))
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start(),
            end: range.end(),
        }
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}
