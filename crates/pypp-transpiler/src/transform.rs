//! Main transpilation pipeline.

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::scanner::BlockScanner;
use pypp_lexer::{shield, UnterminatedKind};
use source_map::{LineIndex, LineMap};
use text_size::TextSize;

/// Options for transpilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranspileOptions {
    /// Emit `pass` into blocks that end up with no statements.
    pub fill_empty_blocks: bool,
    /// Treat `{` after `=`, `(`, `[`, `,` or `return` as the start of a dict
    /// or set literal instead of a block.
    pub data_literals: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            fill_empty_blocks: true,
            data_literals: true,
        }
    }
}

/// The result of transpilation.
#[derive(Debug, Clone)]
pub struct TranspileResult {
    /// The generated Python program, lines joined with `\n`.
    pub code: String,
    /// Warnings, sorted by source line.
    pub diagnostics: Vec<Diagnostic>,
    /// Generated line to source line.
    pub line_map: LineMap,
}

impl TranspileResult {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_warnings(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Source line for a 1-based line of [`TranspileResult::code`].
    pub fn source_line(&self, generated_line: u32) -> Option<u32> {
        self.line_map.source_line(generated_line)
    }
}

/// Transpiles pypp source to Python with default options.
pub fn transpile(source: &str) -> TranspileResult {
    transpile_with_options(source, TranspileOptions::default())
}

/// Transpiles pypp source to Python.
///
/// Always produces output. Anything the scanner had to guess about is
/// reported in [`TranspileResult::diagnostics`].
pub fn transpile_with_options(source: &str, options: TranspileOptions) -> TranspileResult {
    let shielded = shield(source);
    let index = LineIndex::new(source);

    let mut scanner = BlockScanner::new(options);
    let mut offset = 0usize;
    let mut source_line = 1;
    for line in shielded.text.split('\n') {
        // Comments and multi-line strings shift shielded lines away from
        // source lines, so each line start is mapped back explicitly.
        source_line = shielded
            .offsets
            .original_offset(TextSize::from(offset as u32))
            .and_then(|original| index.line_number(original))
            .unwrap_or(source_line);

        scanner.feed(line, source_line);
        offset += line.len() + 1;
    }

    let output = scanner.finish();

    let mut diagnostics = output.diagnostics;
    for unterminated in &shielded.unterminated {
        let line = index.line_number(unterminated.span.start).unwrap_or(1);
        let diagnostic = match unterminated.kind {
            UnterminatedKind::String => Diagnostic::new(
                DiagnosticCode::UnterminatedString,
                "string literal is never closed; it runs to the end of the file",
                line,
            ),
            UnterminatedKind::BlockComment => Diagnostic::new(
                DiagnosticCode::UnterminatedComment,
                "block comment is never closed; it runs to the end of the file",
                line,
            ),
        };
        diagnostics.push(diagnostic);
    }
    diagnostics.sort_by_key(|diag| diag.line);

    let mut line_map = LineMap::builder();
    let mut code_lines = Vec::with_capacity(output.lines.len());
    for line in &output.lines {
        let rendered = shielded.restore(&line.render());
        line_map.push(&rendered, Some(line.source_line));
        code_lines.push(rendered);
    }

    tracing::debug!(
        source_lines = index.line_count(),
        generated_lines = code_lines.len(),
        warnings = diagnostics.len(),
        "transpiled"
    );

    TranspileResult {
        code: code_lines.join("\n"),
        diagnostics,
        line_map: line_map.build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_if_block() {
        let result = transpile("if (x > 0) { y = 1; }");
        assert_snapshot!(result.code, @r"
if (x > 0):
    y = 1
");
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_switch() {
        let result = transpile("switch(n) { case 1 { a = 1; } default { a = 0; } }");
        assert_snapshot!(result.code, @r"
match n:
    case 1:
        a = 1
    case _:
        a = 0
");
    }

    #[test]
    fn test_arrow_lambda() {
        assert_eq!(transpile("f = (a, b) => a + b;").code, "f = lambda a, b: a + b");
    }

    #[test]
    fn test_strings_are_shielded() {
        let result = transpile(r#"print("{ not; a block }"); x = 'a;b';"#);
        assert_snapshot!(result.code, @r#"
print("{ not; a block }")
x = 'a;b'
"#);
    }

    #[test]
    fn test_comment_does_not_open_block() {
        let result = transpile("x = 1; // not a block {\ny = 2;");
        assert_eq!(result.code, "x = 1\ny = 2");
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_function_with_return_type() {
        let result = transpile("fn add(a: int, b: int) -> int {\n    return a + b;\n}");
        assert_snapshot!(result.code, @r"
def add(a: int, b: int) -> int:
    return a + b
");
    }

    #[test]
    fn test_for_in_loop() {
        let result = transpile("for (item : items) {\n    print(item);\n}");
        assert_snapshot!(result.code, @r"
for item in items:
    print(item)
");
    }

    #[test]
    fn test_line_map_follows_source() {
        let source = "/* header\n   comment */\nif x {\n    y = \"\"\"a\nb\"\"\";\n}\nz = 1;";
        let result = transpile(source);
        assert_eq!(result.code, "if x:\n    y = \"\"\"a\nb\"\"\"\nz = 1");
        assert_eq!(result.source_line(1), Some(3));
        assert_eq!(result.source_line(2), Some(4));
        assert_eq!(result.source_line(3), Some(4));
        assert_eq!(result.source_line(4), Some(7));
    }

    #[test]
    fn test_unterminated_string_reported() {
        let result = transpile("x = 1;\ny = 'open;\n");
        assert_eq!(result.warning_count(), 1);
        assert_eq!(
            result.diagnostics[0].code,
            DiagnosticCode::UnterminatedString
        );
        assert_eq!(result.diagnostics[0].line, 2);
    }

    #[test]
    fn test_empty_source() {
        let result = transpile("");
        assert_eq!(result.code, "");
        assert!(result.line_map.is_empty());
    }
}
