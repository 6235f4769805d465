//! Literal-aware pypp lexer using logos.
//!
//! The lexer does not tokenize pypp fully. It only has to tell string
//! literals and comments apart from everything else, so that braces and
//! semicolons inside them are never seen by the block scanner. Identifiers are
//! lexed as whole words so a string prefix (`f"`, `rb'`) is only recognized at
//! the start of a word.

use logos::Logos;
use source_map::Span;

/// Whether a string or block comment found its closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Closure {
    Closed,
    /// Ran to end of input.
    Unterminated,
}

/// The quote character a string literal uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    /// The closing delimiter for a single- or triple-quoted literal.
    pub fn delimiter(self, triple: bool) -> &'static str {
        match (self, triple) {
            (Quote::Double, false) => "\"",
            (Quote::Double, true) => "\"\"\"",
            (Quote::Single, false) => "'",
            (Quote::Single, true) => "'''",
        }
    }
}

/// Shape of a lexed string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringLit {
    pub quote: Quote,
    pub triple: bool,
    pub closure: Closure,
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token kinds.
///
/// Strings take precedence over comments at the same position because the
/// string callbacks consume any `//` or `/*` inside the literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
pub enum TokenKind {
    /// A string literal with an optional prefix of up to two letters.
    /// Triple quoting is detected by the callback.
    #[regex(r#"[fFrRbBuU]?[fFrRbBuU]?""#, |lex| lex_string(lex, Quote::Double))]
    #[regex(r#"[fFrRbBuU]?[fFrRbBuU]?'"#, |lex| lex_string(lex, Quote::Single))]
    String(StringLit),

    /// `// ...` up to the end of the line, newline excluded.
    #[token("//", skip_to_line_end)]
    LineComment,

    /// `/* ... */`, not nested.
    #[token("/*", close_block_comment)]
    BlockComment(Closure),

    /// An identifier or keyword.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    /// A lone `/` (division).
    #[token("/")]
    Slash,

    /// Any run of other characters, newlines included.
    #[regex(r#"[^A-Za-z_"'/]+"#)]
    Code,

    /// Input logos could not match; copied through unchanged.
    Error,
}

impl TokenKind {
    pub fn is_string(&self) -> bool {
        matches!(self, TokenKind::String(_))
    }

    /// Returns true for line and block comments.
    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment(_))
    }

    /// Returns true when a string or block comment ran to end of input.
    pub fn is_unterminated(&self) -> bool {
        matches!(
            self,
            TokenKind::String(StringLit {
                closure: Closure::Unterminated,
                ..
            }) | TokenKind::BlockComment(Closure::Unterminated)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::String(lit) if lit.triple => "triple-quoted string",
            TokenKind::String(_) => "string",
            TokenKind::LineComment => "line comment",
            TokenKind::BlockComment(_) => "block comment",
            TokenKind::Word => "word",
            TokenKind::Slash => "'/'",
            TokenKind::Code => "code",
            TokenKind::Error => "invalid input",
        }
    }
}

/// Called with the opening quote consumed. Two more quotes make it a
/// triple-quoted literal.
fn lex_string(lex: &mut logos::Lexer<'_, TokenKind>, quote: Quote) -> StringLit {
    let single = quote.delimiter(false);
    let rest = lex.remainder();
    let triple = rest.starts_with(single) && rest[single.len()..].starts_with(single);
    if triple {
        lex.bump(2 * single.len());
    }

    StringLit {
        quote,
        triple,
        closure: close_string(lex, quote.delimiter(triple)),
    }
}

/// Consumes a string body up to and including `delim`. A backslash escapes
/// the character after it, newlines included.
fn close_string(lex: &mut logos::Lexer<'_, TokenKind>, delim: &str) -> Closure {
    let rest = lex.remainder();
    let mut chars = rest.char_indices();

    while let Some((idx, ch)) = chars.next() {
        if ch == '\\' {
            chars.next();
            continue;
        }
        if rest[idx..].starts_with(delim) {
            lex.bump(idx + delim.len());
            return Closure::Closed;
        }
    }

    lex.bump(rest.len());
    Closure::Unterminated
}

fn skip_to_line_end(lex: &mut logos::Lexer<'_, TokenKind>) {
    let rest = lex.remainder();
    let end = rest.find('\n').unwrap_or(rest.len());
    lex.bump(end);
}

fn close_block_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> Closure {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Closure::Closed
        }
        None => {
            lex.bump(rest.len());
            Closure::Unterminated
        }
    }
}

/// A lexer over pypp source.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Text of the token most recently returned.
    pub fn slice(&self) -> &'src str {
        self.inner.slice()
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = match self.inner.next()? {
            Ok(kind) => kind,
            Err(()) => TokenKind::Error,
        };
        let span = self.inner.span();

        Some(Token {
            kind,
            span: Span::from_usize(span.start, span.end),
        })
    }
}
