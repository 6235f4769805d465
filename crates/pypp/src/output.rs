//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use pypp_transpiler::Diagnostic;
use serde::Serialize;

/// A formatted diagnostic for output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type (always `Warning`).
    #[serde(rename = "type")]
    pub diagnostic_type: String,
    /// The file path.
    pub filename: String,
    /// 1-based source line.
    pub line: u32,
    /// The message.
    pub message: String,
    /// The diagnostic code.
    pub code: String,
}

impl FormattedDiagnostic {
    pub fn new(diag: &Diagnostic, file_path: &Utf8Path) -> Self {
        Self {
            diagnostic_type: diag.severity.to_string(),
            filename: file_path.to_string(),
            line: diag.line,
            message: diag.message.clone(),
            code: diag.code.to_string(),
        }
    }
}

/// Formats diagnostics for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the diagnostics of one file.
    pub fn format(&self, diagnostics: &[Diagnostic], file_path: &Utf8Path, source: &str) -> String {
        match self.format {
            OutputFormat::Human => Self::format_human(diagnostics, file_path, source),
            OutputFormat::Json => {
                let formatted: Vec<_> = diagnostics
                    .iter()
                    .map(|diag| FormattedDiagnostic::new(diag, file_path))
                    .collect();
                Self::format_json(&formatted)
            }
        }
    }

    /// Formats as human-readable output with the offending source line.
    fn format_human(diagnostics: &[Diagnostic], file_path: &Utf8Path, source: &str) -> String {
        let lines: Vec<&str> = source.lines().collect();
        let mut output = String::new();

        for diag in diagnostics {
            output.push_str(&format!(
                "{}:{}\n{}: {} ({})\n",
                file_path, diag.line, diag.severity, diag.message, diag.code
            ));

            if let Some(text) = (diag.line as usize)
                .checked_sub(1)
                .and_then(|idx| lines.get(idx))
            {
                output.push_str(&format!("  {} | {}\n", diag.line, text.trim_end()));
            }

            output.push('\n');
        }

        output
    }

    /// Formats as a JSON array.
    pub fn format_json(diagnostics: &[FormattedDiagnostic]) -> String {
        serde_json::to_string_pretty(diagnostics).unwrap_or_default()
    }
}

/// Summary of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Number of files transpiled.
    pub file_count: usize,
    /// Number of programs run to completion.
    pub run_count: usize,
    /// Number of execution errors (at most one, the run stops there).
    pub error_count: usize,
    /// Number of transpiler warnings.
    pub warning_count: usize,
    /// Whether to fail on warnings.
    pub fail_on_warnings: bool,
}

impl RunSummary {
    /// Whether the process should exit with status 1.
    pub fn failed(&self) -> bool {
        self.error_count > 0 || (self.fail_on_warnings && self.warning_count > 0)
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let file_word = if self.file_count == 1 { "file" } else { "files" };
        let warning_word = if self.warning_count == 1 {
            "warning"
        } else {
            "warnings"
        };
        let error_word = if self.error_count == 1 {
            "error"
        } else {
            "errors"
        };

        format!(
            "pypp: {} {}, {} {}, {} {}",
            self.file_count,
            file_word,
            self.warning_count,
            warning_word,
            self.error_count,
            error_word
        )
    }
}
