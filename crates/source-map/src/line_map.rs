//! Generated line to source line mapping.

/// For every line of a generated program, the source line it came from.
///
/// Both sides are 1-based, matching what interpreters print in tracebacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMap {
    /// `origins[i]` is the source line of generated line `i + 1`.
    origins: Vec<Option<u32>>,
}

impl LineMap {
    pub fn builder() -> LineMapBuilder {
        LineMapBuilder::default()
    }

    /// Number of generated lines.
    #[inline]
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Source line of the 1-based `generated_line`, if it has one.
    pub fn source_line(&self, generated_line: u32) -> Option<u32> {
        let idx = (generated_line as usize).checked_sub(1)?;
        self.origins.get(idx).copied().flatten()
    }
}

/// Accumulates origins while generated lines are written out.
#[derive(Debug, Default)]
pub struct LineMapBuilder {
    origins: Vec<Option<u32>>,
}

impl LineMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one emitted line.
    ///
    /// `text` may span several physical lines (a restored triple-quoted
    /// string, for example); all of them are attributed to `origin`.
    pub fn push(&mut self, text: &str, origin: Option<u32>) {
        let physical = 1 + text.matches('\n').count();
        self.origins.extend(std::iter::repeat(origin).take(physical));
    }

    pub fn build(self) -> LineMap {
        LineMap {
            origins: self.origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_one_to_one() {
        let mut builder = LineMap::builder();
        builder.push("if x:", Some(1));
        builder.push("    y = 1", Some(2));

        let map = builder.build();
        assert_eq!(map.len(), 2);
        assert_eq!(map.source_line(1), Some(1));
        assert_eq!(map.source_line(2), Some(2));
        assert_eq!(map.source_line(0), None);
        assert_eq!(map.source_line(3), None);
    }

    #[test]
    fn test_multiline_text_shares_origin() {
        let mut builder = LineMap::builder();
        builder.push("doc = \"\"\"first\nsecond\"\"\"", Some(4));
        builder.push("pass", None);

        let map = builder.build();
        assert_eq!(map.len(), 3);
        assert_eq!(map.source_line(2), Some(4));
        assert_eq!(map.source_line(3), None);
    }
}
