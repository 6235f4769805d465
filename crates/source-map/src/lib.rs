//! Position tracking for the pypp transpiler.
//!
//! Shielding rewrites the source before it is scanned (strings become
//! placeholders, comments disappear), and the scanner then re-flows what is
//! left into indented Python lines. This crate keeps track of both steps so
//! that a position in the generated program can be traced back to a line in
//! the original `.pypp` file:
//!
//! - [`OffsetMap`] maps byte offsets in shielded text back to the source;
//! - [`LineIndex`] converts source byte offsets into line/column positions;
//! - [`LineMap`] maps generated program lines to source lines.

mod line_index;
mod line_map;
mod offset_map;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use line_map::{LineMap, LineMapBuilder};
pub use offset_map::{OffsetMap, OffsetMapBuilder, Segment};
pub use span::{ByteOffset, Span};
