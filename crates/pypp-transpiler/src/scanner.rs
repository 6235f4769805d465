//! Block scanner.
//!
//! Consumes shielded source one line at a time, splits it on `{`, `}` and
//! `;`, and emits Python statements at the indentation implied by the open
//! blocks. All state lives in one [`BlockScanner`] value that is created for
//! a single transpilation and consumed by [`BlockScanner::finish`].

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::raw::{self, RawLine, Segment};
use crate::rules::{self, BlockKind};
use crate::transform::TranspileOptions;

/// One level of Python indentation.
pub const INDENT: &str = "    ";

/// A line of output, still shielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedLine {
    /// Indentation depth in units of [`INDENT`]. Raw lines are always 0.
    pub indent: usize,
    pub text: String,
    /// 1-based source line the text came from.
    pub source_line: u32,
}

impl EmittedLine {
    /// The line with its indentation applied.
    pub fn render(&self) -> String {
        let mut out = INDENT.repeat(self.indent);
        out.push_str(&self.text);
        out
    }
}

/// What the scanner produced.
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub lines: Vec<EmittedLine>,
    /// Sorted by line.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    kind: BlockKind,
    /// Source line of the statement (or brace) that opened the block.
    line: u32,
    /// `lines.len()` right after the block opened; unchanged at close means
    /// the block is empty.
    emitted_at_open: usize,
}

/// A `{ ... }` data literal being copied into the buffer.
#[derive(Debug, Clone, Copy)]
struct DataLiteral {
    depth: usize,
    opened_at: u32,
    /// Set at end of line; the next visible character is joined with a
    /// single space.
    line_break: bool,
}

/// The scan state for one transpilation.
#[derive(Debug)]
pub struct BlockScanner {
    options: TranspileOptions,
    block_stack: Vec<OpenBlock>,
    raw_mode: bool,
    raw_opened_at: u32,
    buffer: String,
    buffer_line: u32,
    literal: Option<DataLiteral>,
    /// The last thing appended to the buffer closed a data literal.
    after_literal: bool,
    /// Kind of the most recent flushed statement, for a `{` on its own line.
    last_kind: BlockKind,
    lines: Vec<EmittedLine>,
    diagnostics: Vec<Diagnostic>,
}

impl BlockScanner {
    pub fn new(options: TranspileOptions) -> Self {
        Self {
            options,
            block_stack: Vec::new(),
            raw_mode: false,
            raw_opened_at: 0,
            buffer: String::new(),
            buffer_line: 0,
            literal: None,
            after_literal: false,
            last_kind: BlockKind::Normal,
            lines: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Current indentation depth, equal to the number of open blocks.
    #[inline]
    pub fn indent_level(&self) -> usize {
        self.block_stack.len()
    }

    /// Kinds of the open blocks, outermost first.
    pub fn open_blocks(&self) -> impl Iterator<Item = BlockKind> + '_ {
        self.block_stack.iter().map(|block| block.kind)
    }

    /// Whether the scanner is inside a multi-line `PYL{ ... }PYL` region.
    #[inline]
    pub fn in_raw_region(&self) -> bool {
        self.raw_mode
    }

    /// Brace depth of the open data literal, 0 when none is open.
    pub fn literal_depth(&self) -> usize {
        self.literal.map_or(0, |literal| literal.depth)
    }

    pub fn lines(&self) -> &[EmittedLine] {
        &self.lines
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Scans one line of shielded text (without its newline).
    pub fn feed(&mut self, line: &str, source_line: u32) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        tracing::trace!(source_line, indent = self.indent_level(), "scan line");

        if self.raw_mode {
            self.feed_raw(line, source_line);
            return;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if self.literal.is_none() {
            if let Some(raw_line) = raw::classify(trimmed) {
                match raw_line {
                    RawLine::Whole(text) | RawLine::Close(text) => {
                        self.emit_raw(text, source_line);
                    }
                    RawLine::Open(text) => {
                        self.raw_mode = true;
                        self.raw_opened_at = source_line;
                        self.emit_raw(text, source_line);
                    }
                }
                return;
            }
        }

        for segment in raw::split_inline(trimmed) {
            match segment {
                Segment::Code(code) => {
                    let code = rules::normalize_line(code);
                    self.scan(&code, source_line);
                }
                Segment::Raw(text) => self.emit_inline_raw(text, source_line),
            }
        }

        match self.literal.as_mut() {
            Some(literal) => literal.line_break = true,
            None => self.flush(),
        }
    }

    /// Flushes what is left and reports anything still open.
    pub fn finish(mut self) -> ScanOutput {
        if let Some(literal) = self.literal.take() {
            self.warn(
                DiagnosticCode::UnclosedDataLiteral,
                "data literal `{` is never closed",
                literal.opened_at,
            );
        }
        self.flush();

        if self.raw_mode {
            self.warn(
                DiagnosticCode::UnclosedRawRegion,
                "raw region `PYL{` is never closed with `}PYL`",
                self.raw_opened_at,
            );
        }

        while let Some(block) = self.block_stack.pop() {
            self.fill_if_empty(&block, block.line);
            self.warn(
                DiagnosticCode::UnclosedBlock,
                "block is never closed",
                block.line,
            );
        }

        tracing::debug!(
            lines = self.lines.len(),
            warnings = self.diagnostics.len(),
            "scan finished"
        );

        self.diagnostics.sort_by_key(|diag| diag.line);
        ScanOutput {
            lines: self.lines,
            diagnostics: self.diagnostics,
        }
    }

    fn feed_raw(&mut self, line: &str, source_line: u32) {
        match raw::closing(line.trim()) {
            Some(before) => {
                self.raw_mode = false;
                self.emit_raw(before, source_line);
            }
            None => self.lines.push(EmittedLine {
                indent: 0,
                text: line.to_string(),
                source_line,
            }),
        }
    }

    /// Splits structural text on `{`, `}` and `;`.
    fn scan(&mut self, text: &str, line: u32) {
        let mut fragment = String::new();
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == '\\' {
                if let Some(&brace @ ('{' | '}')) = chars.peek() {
                    chars.next();
                    if self.literal.is_some() {
                        self.push_literal_char(brace, false);
                    } else {
                        fragment.push(brace);
                    }
                    continue;
                }
            }

            if self.literal.is_some() {
                self.push_literal_char(ch, true);
                continue;
            }

            match ch {
                '{' => {
                    self.push_fragment(&fragment, line);
                    fragment.clear();
                    self.open_brace(line);
                }
                '}' => {
                    self.push_fragment(&fragment, line);
                    fragment.clear();
                    self.close_brace(line);
                }
                ';' => {
                    self.push_fragment(&fragment, line);
                    fragment.clear();
                    self.flush();
                }
                _ => fragment.push(ch),
            }
        }

        self.push_fragment(&fragment, line);
    }

    /// Appends trimmed text to the buffer, joined with a single space.
    fn push_fragment(&mut self, fragment: &str, line: u32) {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            return;
        }

        if self.buffer.is_empty() {
            self.buffer_line = line;
        } else if !self.after_literal || fragment.starts_with(char::is_whitespace) {
            self.buffer.push(' ');
        }
        self.buffer.push_str(trimmed);
        self.after_literal = false;
    }

    /// Copies one character of an open data literal into the buffer.
    ///
    /// `structural` is false for an escaped brace, which never changes the
    /// literal's depth.
    fn push_literal_char(&mut self, ch: char, structural: bool) {
        let Some(literal) = self.literal.as_mut() else {
            return;
        };

        if literal.line_break {
            if ch.is_whitespace() {
                return;
            }
            literal.line_break = false;
            let closes = matches!(ch, ')' | ']' | '}');
            if !closes && !self.buffer.ends_with(|c: char| matches!(c, '(' | '[' | '{' | ' ')) {
                self.buffer.push(' ');
            }
        }

        if structural {
            match ch {
                '{' => literal.depth += 1,
                '}' => literal.depth -= 1,
                _ => {}
            }
        }
        self.buffer.push(ch);

        if literal.depth == 0 {
            self.literal = None;
            self.after_literal = true;
        }
    }

    fn open_brace(&mut self, line: u32) {
        if self.options.data_literals && opens_data_literal(&self.buffer) {
            if !self.buffer.ends_with(|c: char| matches!(c, '(' | '[')) {
                self.buffer.push(' ');
            }
            self.buffer.push('{');
            self.literal = Some(DataLiteral {
                depth: 1,
                opened_at: line,
                line_break: false,
            });
            return;
        }

        if self.buffer.is_empty() {
            match self.lines.last_mut() {
                Some(last) => append_block_colon(&mut last.text),
                None => self.warn(
                    DiagnosticCode::StrayBlockOpen,
                    "`{` has no statement before it to open a block for",
                    line,
                ),
            }
            self.push_block(self.last_kind, line);
            return;
        }

        let buffer = std::mem::take(&mut self.buffer);
        self.after_literal = false;
        let rewrite = rules::rewrite_statement(buffer.trim());
        let mut statement = rewrite.statement;
        append_block_colon(&mut statement);

        let opened_at = self.buffer_line;
        self.emit(statement, opened_at);
        self.push_block(rewrite.kind, opened_at);
    }

    fn close_brace(&mut self, line: u32) {
        self.flush();
        self.last_kind = BlockKind::Normal;

        match self.block_stack.pop() {
            Some(block) => self.fill_if_empty(&block, line),
            None => self.warn(
                DiagnosticCode::UnmatchedClose,
                "`}` has no open block to close",
                line,
            ),
        }
    }

    fn push_block(&mut self, kind: BlockKind, line: u32) {
        self.block_stack.push(OpenBlock {
            kind,
            line,
            emitted_at_open: self.lines.len(),
        });
    }

    /// Emits `pass` into a just-closed block that received no statements.
    fn fill_if_empty(&mut self, block: &OpenBlock, line: u32) {
        if self.options.fill_empty_blocks && self.lines.len() == block.emitted_at_open {
            self.lines.push(EmittedLine {
                indent: self.block_stack.len() + 1,
                text: "pass".to_string(),
                source_line: line,
            });
        }
    }

    /// Emits the buffer as a statement, if it holds one.
    fn flush(&mut self) {
        self.after_literal = false;
        let buffer = std::mem::take(&mut self.buffer);
        let statement = buffer.trim();
        if statement.is_empty() {
            return;
        }

        let rewrite = rules::rewrite_statement(statement);
        if let Some(rule) = rewrite.rule {
            tracing::trace!(rule, line = self.buffer_line, "rewrite rule applied");
        }
        self.last_kind = rewrite.kind;
        self.emit(rewrite.statement, self.buffer_line);
    }

    fn emit(&mut self, text: String, source_line: u32) {
        self.lines.push(EmittedLine {
            indent: self.indent_level(),
            text,
            source_line,
        });
    }

    /// Emits raw text unindented.
    fn emit_raw(&mut self, text: &str, source_line: u32) {
        if text.is_empty() {
            return;
        }
        self.lines.push(EmittedLine {
            indent: 0,
            text: text.to_string(),
            source_line,
        });
    }

    /// Emits an inline `PYL{...}PYL` at the current indentation, after
    /// flushing the statement before it.
    fn emit_inline_raw(&mut self, text: &str, source_line: u32) {
        if self.literal.is_some() {
            for ch in text.chars() {
                self.push_literal_char(ch, false);
            }
            return;
        }

        self.flush();
        if !text.is_empty() {
            self.emit(text.to_string(), source_line);
        }
    }

    fn warn(&mut self, code: DiagnosticCode, message: &str, line: u32) {
        tracing::debug!(code = %code, line, "{message}");
        self.diagnostics.push(Diagnostic::new(code, message, line));
    }
}

/// Appends `:` unless the statement already ends with one.
fn append_block_colon(statement: &mut String) {
    if !statement.ends_with(':') {
        statement.push(':');
    }
}

/// A `{` after `=`, `(`, `[`, `,` or `return` starts a value, not a block.
fn opens_data_literal(buffer: &str) -> bool {
    let buffer = buffer.trim_end();
    if buffer.ends_with(|c: char| matches!(c, '=' | '(' | '[' | ',')) {
        return true;
    }

    buffer.strip_suffix("return").is_some_and(|before| {
        !before
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
    })
}
