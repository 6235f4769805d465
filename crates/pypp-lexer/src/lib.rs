//! Literal shielding for the pypp transpiler.
//!
//! Braces and semicolons inside string literals or comments must never reach
//! the block scanner. This crate lexes pypp source just far enough to find
//! those regions (using `logos`), swaps every string for an opaque placeholder,
//! drops every comment, and restores the strings afterwards.
//!
//! # Example
//!
//! ```
//! use pypp_lexer::shield;
//!
//! let shielded = shield(r#"print("{ }"); // done"#);
//! assert_eq!(shielded.text, "print(__PYPP_LIT_0__); ");
//! assert_eq!(shielded.restore("print(__PYPP_LIT_0__)"), r#"print("{ }")"#);
//! ```

mod lexer;
mod literal;
mod shield;

pub use lexer::{Closure, Lexer, Quote, StringLit, Token, TokenKind};
pub use literal::{Literal, LiteralTable, DEFAULT_PREFIX};
pub use shield::{shield, Shielded, Unterminated, UnterminatedKind};
pub use source_map::Span;
