//! Literal shield: hides string literals and drops comments before the
//! structural scan.

use crate::lexer::{Lexer, Token, TokenKind};
use crate::literal::LiteralTable;
use source_map::{OffsetMap, Span};

/// What ran to end of input without being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnterminatedKind {
    String,
    BlockComment,
}

/// A string or block comment with no closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unterminated {
    pub kind: UnterminatedKind,
    /// Span in the original source, running to end of input.
    pub span: Span,
}

/// Source text with every string literal replaced by a placeholder and every
/// comment removed.
#[derive(Debug, Clone)]
pub struct Shielded {
    /// The shielded text.
    pub text: String,
    /// Literals lifted out of the source, keyed by placeholder id.
    pub literals: LiteralTable,
    /// Maps offsets in `text` back to the original source.
    pub offsets: OffsetMap,
    pub unterminated: Vec<Unterminated>,
}

impl Shielded {
    /// Puts the original literals back into `text`.
    pub fn restore(&self, text: &str) -> String {
        self.literals.restore(text)
    }
}

/// Shields `source`.
///
/// Never fails: an unterminated string or block comment extends to end of
/// input and is reported in [`Shielded::unterminated`].
pub fn shield(source: &str) -> Shielded {
    let tokens: Vec<Token> = Lexer::new(source).collect();

    // Removing a comment can join the text around it, so the prefix has to be
    // unique in that joined text as well as in the source.
    let without_comments: String = tokens
        .iter()
        .filter(|token| !token.kind.is_comment())
        .filter_map(|token| token.span.slice(source))
        .collect();
    let mut literals = LiteralTable::avoiding(&[source, &without_comments]);

    let mut text = String::with_capacity(source.len());
    let mut offsets = OffsetMap::builder();
    let mut unterminated = Vec::new();

    for token in &tokens {
        let Some(slice) = token.span.slice(source) else {
            continue;
        };

        match token.kind {
            TokenKind::String(_) => {
                if token.kind.is_unterminated() {
                    unterminated.push(Unterminated {
                        kind: UnterminatedKind::String,
                        span: token.span,
                    });
                }
                let placeholder = literals.insert(slice, token.span);
                offsets.substitute(token.span, &placeholder);
                text.push_str(&placeholder);
            }
            TokenKind::LineComment | TokenKind::BlockComment(_) => {
                if token.kind.is_unterminated() {
                    unterminated.push(Unterminated {
                        kind: UnterminatedKind::BlockComment,
                        span: token.span,
                    });
                }
            }
            TokenKind::Word | TokenKind::Slash | TokenKind::Code | TokenKind::Error => {
                offsets.copy(token.span.start, slice);
                text.push_str(slice);
            }
        }
    }

    tracing::debug!(
        literals = literals.len(),
        unterminated = unterminated.len(),
        prefix = literals.prefix(),
        "shielded source"
    );

    Shielded {
        text,
        literals,
        offsets: offsets.build(),
        unterminated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use text_size::TextSize;

    #[test]
    fn test_strings_become_placeholders() {
        let shielded = shield(r#"print("{ not a block; }");"#);
        assert_eq!(shielded.text, "print(__PYPP_LIT_0__);");
        assert_eq!(shielded.literals.len(), 1);
        assert_eq!(
            shielded.literals.get(0).map(|l| l.text.as_str()),
            Some(r#""{ not a block; }""#)
        );
    }

    #[test]
    fn test_comments_are_removed() {
        let shielded = shield("x = 1; // not a block { }\ny = 2; /* } */");
        assert_eq!(shielded.text, "x = 1; \ny = 2; ");
        assert!(shielded.literals.is_empty());
    }

    #[test]
    fn test_restore_is_exact() {
        let source = "s = f'{a}' + \"\"\"x\n}\"\"\"; t = '';";
        let shielded = shield(source);
        assert!(!shielded.text.contains('}'));
        assert_eq!(shielded.restore(&shielded.text), source);
    }

    #[test]
    fn test_offsets_skip_placeholders() {
        let source = "a = \"long literal\";\nb = 1;";
        let shielded = shield(source);

        let b_shielded = shielded.text.find('b').unwrap();
        let b_original = source.find('b').unwrap();
        assert_eq!(
            shielded
                .offsets
                .original_offset(TextSize::from(b_shielded as u32)),
            Some(TextSize::from(b_original as u32))
        );
    }

    #[test]
    fn test_unterminated_are_reported() {
        let shielded = shield("x = 'open;\n");
        assert_eq!(shielded.unterminated.len(), 1);
        assert_eq!(shielded.unterminated[0].kind, UnterminatedKind::String);
        assert_eq!(shielded.unterminated[0].span, Span::from_usize(4, 11));

        let shielded = shield("x; /* open");
        assert_eq!(shielded.text, "x; ");
        assert_eq!(
            shielded.unterminated[0].kind,
            UnterminatedKind::BlockComment
        );
    }

    #[test]
    fn test_prefix_avoids_text_joined_by_comment_removal() {
        let shielded = shield("__PYPP/**/_LIT_0__ = 's';");
        assert_eq!(shielded.literals.prefix(), "___PYPP_LIT_");
        assert_eq!(shielded.restore(&shielded.text), "__PYPP_LIT_0__ = 's';");
    }
}
