//! pypp to Python transpilation.
//!
//! pypp is Python written with braces and semicolons. This crate turns it
//! back into indentation-structured Python source:
//! - string literals and comments are shielded so their braces never count
//! - `{`, `}` and `;` are turned into block headers, indentation and line
//!   breaks
//! - a small rule table rewrites dialect sugar (`=>` lambdas, `for (x : xs)`,
//!   `switch`/`case`/`default`, `fn`, return-type arrows)
//! - `PYL{ ... }PYL` regions pass through untouched
//!
//! Malformed input never fails; the problems are reported as diagnostics.
//!
//! # Example
//!
//! ```
//! use pypp_transpiler::transpile;
//!
//! let source = r#"
//! fn greet(name) {
//!     if (name) { print("hi", name); } else { print("hi"); }
//! }
//! "#;
//!
//! let result = transpile(source);
//! assert!(result.diagnostics.is_empty());
//! println!("{}", result.code);
//! ```

mod diagnostic;
mod raw;
mod rules;
mod scanner;
mod transform;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use raw::{RAW_CLOSE, RAW_OPEN};
pub use rules::{normalize_line, rewrite_statement, BlockKind, Rewrite, Rule, RULES};
pub use scanner::{BlockScanner, EmittedLine, ScanOutput, INDENT};
pub use source_map::LineMap;
pub use transform::{transpile, transpile_with_options, TranspileOptions, TranspileResult};
