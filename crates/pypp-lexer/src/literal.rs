//! Placeholder table for shielded string literals.

use source_map::Span;

/// Default placeholder prefix.
pub const DEFAULT_PREFIX: &str = "__PYPP_LIT_";

/// Placeholder suffix, written after the numeric id.
const SUFFIX: &str = "__";

/// A string literal lifted out of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub id: u32,
    /// Exact source text, quotes and prefix letters included.
    pub text: String,
    /// Where the literal sits in the original source.
    pub span: Span,
}

/// Ordered table of shielded literals.
///
/// Ids are assigned in discovery order starting at 0, so an id doubles as the
/// index into the table.
#[derive(Debug, Clone)]
pub struct LiteralTable {
    prefix: String,
    entries: Vec<Literal>,
}

impl Default for LiteralTable {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            entries: Vec::new(),
        }
    }
}

impl LiteralTable {
    /// Creates a table whose placeholder prefix occurs nowhere in `source`.
    pub fn for_source(source: &str) -> Self {
        Self::avoiding(&[source])
    }

    /// Creates a table whose placeholder prefix occurs in none of `texts`.
    ///
    /// The prefix gains a leading underscore until it is unique.
    pub fn avoiding(texts: &[&str]) -> Self {
        let mut prefix = DEFAULT_PREFIX.to_string();
        while texts.iter().any(|text| text.contains(prefix.as_str())) {
            prefix.insert(0, '_');
        }

        Self {
            prefix,
            entries: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Records a literal and returns the placeholder that stands in for it.
    pub fn insert(&mut self, text: impl Into<String>, span: Span) -> String {
        let id = self.entries.len() as u32;
        self.entries.push(Literal {
            id,
            text: text.into(),
            span,
        });
        self.placeholder(id)
    }

    /// The placeholder text for `id`.
    pub fn placeholder(&self, id: u32) -> String {
        format!("{}{}{}", self.prefix, id, SUFFIX)
    }

    pub fn get(&self, id: u32) -> Option<&Literal> {
        self.entries.get(id as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.entries.iter()
    }

    /// Replaces every placeholder in `text` with its literal.
    ///
    /// Single left-to-right pass: restored text is never rescanned, and a
    /// placeholder with an unknown id (or a malformed one) is copied as is.
    pub fn restore(&self, text: &str) -> String {
        if self.entries.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(self.prefix.as_str()) {
            out.push_str(&rest[..start]);
            let after_prefix = &rest[start + self.prefix.len()..];

            match self.parse_placeholder(after_prefix) {
                Some((literal, consumed)) => {
                    out.push_str(&literal.text);
                    rest = &after_prefix[consumed..];
                }
                None => {
                    // Copy one byte of the prefix (ASCII) and search again so
                    // a real placeholder overlapping this one is still found.
                    out.push_str(&rest[start..start + 1]);
                    rest = &rest[start + 1..];
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Parses `<id>__` at the start of `text`.
    fn parse_placeholder(&self, text: &str) -> Option<(&Literal, usize)> {
        let digits = text.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || !text[digits..].starts_with(SUFFIX) {
            return None;
        }

        let id: u32 = text[..digits].parse().ok()?;
        let literal = self.get(id)?;
        Some((literal, digits + SUFFIX.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span() -> Span {
        Span::default()
    }

    #[test]
    fn test_placeholder_shape() {
        let mut table = LiteralTable::for_source("x = 1;");
        assert_eq!(table.insert("\"a\"", span()), "__PYPP_LIT_0__");
        assert_eq!(table.insert("'b'", span()), "__PYPP_LIT_1__");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).map(|l| l.text.as_str()), Some("'b'"));
    }

    #[test]
    fn test_prefix_avoids_source_text() {
        let table = LiteralTable::for_source("__PYPP_LIT_0__ = 1; ___PYPP_LIT_ = 2;");
        assert_eq!(table.prefix(), "____PYPP_LIT_");
    }

    #[test]
    fn test_restore_replaces_in_one_pass() {
        let mut table = LiteralTable::for_source("");
        let first = table.insert("\"__PYPP_LIT_1__\"", span());
        let second = table.insert("'{'", span());

        let text = format!("print({first}, {second})");
        assert_eq!(table.restore(&text), "print(\"__PYPP_LIT_1__\", '{')");
    }

    #[test]
    fn test_restore_leaves_unknown_and_malformed() {
        let mut table = LiteralTable::for_source("");
        let known = table.insert("\"x\"", span());

        let text = format!("__PYPP_LIT_7__ __PYPP_LIT_x__ {known}");
        assert_eq!(table.restore(&text), "__PYPP_LIT_7__ __PYPP_LIT_x__ \"x\"");
    }

    #[test]
    fn test_restore_adjacent_to_identifiers() {
        let mut table = LiteralTable::for_source("");
        let known = table.insert("\"x\"", span());

        let text = format!("_{known}12");
        assert_eq!(table.restore(&text), "_\"x\"12");
    }

    #[test]
    fn test_restore_without_literals_is_identity() {
        let table = LiteralTable::default();
        assert_eq!(table.restore("__PYPP_LIT_0__"), "__PYPP_LIT_0__");
    }
}
