//! Offset to line/column conversion.

use crate::ByteOffset;
use text_size::TextSize;

/// A 0-indexed line and column (column counted in bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed byte column.
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Start offsets of every line in a text, for binary-searched lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[i]` is the offset where line `i` begins.
    line_starts: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    /// Indexes `text`. Only `\n` starts a new line; a preceding `\r` stays
    /// part of the previous line.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        line_starts.extend(
            text.match_indices('\n')
                .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
        );

        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    /// Number of lines; a trailing newline opens one final empty line.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts an offset to a line/column position.
    ///
    /// Returns `None` for offsets past the end of the text.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        };
        let col = u32::from(offset) - u32::from(self.line_starts[line]);

        Some(LineCol::new(line as u32, col))
    }

    /// 1-based line number of `offset`, as shown to users.
    pub fn line_number(&self, offset: ByteOffset) -> Option<u32> {
        self.line_col(offset).map(|lc| lc.line + 1)
    }

    /// Converts a line/column position back to an offset.
    pub fn offset(&self, line_col: LineCol) -> Option<ByteOffset> {
        let start = *self.line_starts.get(line_col.line as usize)?;
        Some(start + TextSize::from(line_col.col))
    }

    /// Offset where 0-indexed `line` begins.
    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        self.line_starts.get(line as usize).copied()
    }
}
