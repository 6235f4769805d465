//! Raw-passthrough regions.
//!
//! Text between `PYL{` and `}PYL` is Python the author wrote by hand. The
//! scanner copies it to the output without splitting, rewriting or
//! re-indenting it.

/// Opens a raw region.
pub const RAW_OPEN: &str = "PYL{";
/// Closes a raw region.
pub const RAW_CLOSE: &str = "}PYL";

/// How a trimmed line outside a raw region uses the sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLine<'a> {
    /// `PYL{ ... }PYL` on one line; holds the trimmed interior.
    Whole(&'a str),
    /// Starts with `PYL{`; holds the trimmed text after it.
    Open(&'a str),
    /// Ends with `}PYL`; holds the trimmed text before it.
    Close(&'a str),
}

/// Classifies a trimmed line that is not inside a raw region.
///
/// Returns `None` for structural lines, which may still contain inline
/// regions (see [`split_inline`]).
pub fn classify(trimmed: &str) -> Option<RawLine<'_>> {
    if let Some(after_open) = trimmed.strip_prefix(RAW_OPEN) {
        if let Some(interior) = after_open.strip_suffix(RAW_CLOSE) {
            if !interior.contains(RAW_CLOSE) {
                return Some(RawLine::Whole(interior.trim()));
            }
        }
        // A close before the end makes this an inline pair followed by code.
        if after_open.contains(RAW_CLOSE) {
            return None;
        }
        return Some(RawLine::Open(after_open.trim()));
    }

    let before_close = trimmed.strip_suffix(RAW_CLOSE)?;
    if before_close.contains(RAW_OPEN) {
        return None;
    }
    Some(RawLine::Close(before_close.trim()))
}

/// If a trimmed line ends a raw region, returns the trimmed text before the
/// sentinel.
pub fn closing(trimmed: &str) -> Option<&str> {
    trimmed.strip_suffix(RAW_CLOSE).map(str::trim)
}

/// A piece of a structural line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text for the block scanner.
    Code(&'a str),
    /// Content of an inline `PYL{...}PYL`, trimmed.
    Raw(&'a str),
}

/// Splits a line at each inline `PYL{...}PYL` pair.
///
/// Each pair is the shortest match. An opening sentinel with no closing one
/// after it is left in the code.
pub fn split_inline(line: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find(RAW_OPEN) {
        let after_open = &rest[open + RAW_OPEN.len()..];
        let Some(close) = after_open.find(RAW_CLOSE) else {
            break;
        };

        if open > 0 {
            segments.push(Segment::Code(&rest[..open]));
        }
        segments.push(Segment::Raw(after_open[..close].trim()));
        rest = &after_open[close + RAW_CLOSE.len()..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Code(rest));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_whole_line() {
        assert_eq!(
            classify("PYL{ print({1: 2}) }PYL"),
            Some(RawLine::Whole("print({1: 2})"))
        );
        assert_eq!(classify("PYL{}PYL"), Some(RawLine::Whole("")));
    }

    #[test]
    fn test_classify_open_and_close() {
        assert_eq!(classify("PYL{"), Some(RawLine::Open("")));
        assert_eq!(classify("PYL{ x = 1"), Some(RawLine::Open("x = 1")));
        assert_eq!(classify("y = 2 }PYL"), Some(RawLine::Close("y = 2")));
        assert_eq!(classify("if x {"), None);
    }

    #[test]
    fn test_classify_inline_pairs_are_structural() {
        assert_eq!(classify("x = 1; PYL{ y = 2 }PYL"), None);
        assert_eq!(classify("if a { foo(); PYL{ bar() }PYL"), None);
        assert_eq!(classify("PYL{ a }PYL x = 1;"), None);
        assert_eq!(classify("PYL{ a }PYL; PYL{ b }PYL"), None);
    }

    #[test]
    fn test_split_inline() {
        assert_eq!(
            split_inline("a = 1; PYL{ b = {} }PYL c = 2;"),
            vec![
                Segment::Code("a = 1; "),
                Segment::Raw("b = {}"),
                Segment::Code(" c = 2;"),
            ]
        );
    }

    #[test]
    fn test_split_inline_shortest_match() {
        assert_eq!(
            split_inline("PYL{a}PYL;PYL{b}PYL"),
            vec![Segment::Raw("a"), Segment::Code(";"), Segment::Raw("b")]
        );
    }

    #[test]
    fn test_split_inline_unclosed_stays_code() {
        assert_eq!(
            split_inline("x = 1; PYL{ y"),
            vec![Segment::Code("x = 1; PYL{ y")]
        );
    }
}
