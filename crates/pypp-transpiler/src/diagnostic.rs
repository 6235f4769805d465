//! Diagnostic types.

/// A warning raised while transpiling.
///
/// Transpilation never fails. Anything it had to guess about is reported
/// here instead, attributed to a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// 1-based source line.
    pub line: u32,
}

impl Diagnostic {
    /// Creates a new diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, line: u32) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            line,
        }
    }
}

/// The severity of a diagnostic.
///
/// Transpilation never fails, so every diagnostic is a warning: output was
/// produced, but may not mean what the author intended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // === Block structure ===
    /// `unmatched-close`: `}` with no open block
    UnmatchedClose,
    /// `unclosed-block`: block still open at end of input
    UnclosedBlock,
    /// `stray-block-open`: `{` with nothing before it to attach to
    StrayBlockOpen,
    /// `unclosed-data-literal`: `{ ... }` literal still open at end of input
    UnclosedDataLiteral,

    // === Raw regions ===
    /// `unclosed-raw-region`: `PYL{` without a matching `}PYL`
    UnclosedRawRegion,

    // === Literals ===
    /// `unterminated-string`
    UnterminatedString,
    /// `unterminated-comment`
    UnterminatedComment,
}

impl DiagnosticCode {
    /// Returns the default severity for this diagnostic code.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::UnmatchedClose
            | DiagnosticCode::UnclosedBlock
            | DiagnosticCode::StrayBlockOpen
            | DiagnosticCode::UnclosedDataLiteral
            | DiagnosticCode::UnclosedRawRegion
            | DiagnosticCode::UnterminatedString
            | DiagnosticCode::UnterminatedComment => Severity::Warning,
        }
    }

    /// Returns the diagnostic code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnmatchedClose => "unmatched-close",
            DiagnosticCode::UnclosedBlock => "unclosed-block",
            DiagnosticCode::StrayBlockOpen => "stray-block-open",
            DiagnosticCode::UnclosedDataLiteral => "unclosed-data-literal",
            DiagnosticCode::UnclosedRawRegion => "unclosed-raw-region",
            DiagnosticCode::UnterminatedString => "unterminated-string",
            DiagnosticCode::UnterminatedComment => "unterminated-comment",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
