//! Offset mapping from rewritten text back to the text it was produced from.

use crate::{ByteOffset, Span};
use text_size::TextSize;

/// A generated range and the original range it stands for.
///
/// Copied text has equal lengths on both sides. Substituted text (a
/// placeholder standing in for a string literal) usually does not; every
/// generated offset inside it maps into the original range, clamped to its
/// end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Range in the generated text.
    pub generated: Span,
    /// Range in the original text.
    pub original: Span,
}

/// Maps offsets in rewritten text back to the original text.
#[derive(Debug, Clone, Default)]
pub struct OffsetMap {
    /// Sorted by generated start, non-overlapping.
    segments: Vec<Segment>,
}

impl OffsetMap {
    pub fn builder() -> OffsetMapBuilder {
        OffsetMapBuilder::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Finds the original offset for a generated offset.
    ///
    /// Returns `None` when no segment covers `generated` (for example the
    /// offset one past the end of the generated text).
    pub fn original_offset(&self, generated: ByteOffset) -> Option<ByteOffset> {
        let idx = match self
            .segments
            .binary_search_by(|s| s.generated.start.cmp(&generated))
        {
            Ok(idx) => idx,
            Err(0) => return None,
            Err(idx) => idx - 1,
        };

        let segment = self.segments.get(idx)?;
        if !segment.generated.contains(generated) {
            return None;
        }

        let delta = (generated - segment.generated.start).min(segment.original.len());
        Some(segment.original.start + delta)
    }
}

/// Records segments while rewritten text is being produced.
#[derive(Debug, Default)]
pub struct OffsetMapBuilder {
    segments: Vec<Segment>,
    generated_offset: ByteOffset,
}

impl OffsetMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length of the generated text written so far.
    #[inline]
    pub fn generated_offset(&self) -> ByteOffset {
        self.generated_offset
    }

    /// Records `text` copied unchanged from `original_start`.
    ///
    /// A copy that continues the previous copy on both sides extends it
    /// instead of adding a new segment.
    pub fn copy(&mut self, original_start: ByteOffset, text: &str) {
        let len = TextSize::from(text.len() as u32);
        if len == TextSize::from(0) {
            return;
        }

        if let Some(last) = self.segments.last_mut() {
            let last_is_copy = last.generated.len() == last.original.len();
            if last_is_copy
                && last.generated.end == self.generated_offset
                && last.original.end == original_start
            {
                last.generated.end += len;
                last.original.end += len;
                self.generated_offset += len;
                return;
            }
        }

        self.segments.push(Segment {
            generated: Span::new(self.generated_offset, self.generated_offset + len),
            original: Span::new(original_start, original_start + len),
        });
        self.generated_offset += len;
    }

    /// Records `generated_text` written in place of the `original` range.
    pub fn substitute(&mut self, original: Span, generated_text: &str) {
        let len = TextSize::from(generated_text.len() as u32);
        if len == TextSize::from(0) {
            return;
        }

        self.segments.push(Segment {
            generated: Span::new(self.generated_offset, self.generated_offset + len),
            original,
        });
        self.generated_offset += len;
    }

    pub fn build(self) -> OffsetMap {
        OffsetMap {
            segments: self.segments,
        }
    }
}
