//! Python process runner.

use crate::traceback::parse_traceback;
use camino::{Utf8Path, Utf8PathBuf};
use std::future::Future;
use std::io::Write;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Error types for the Python runner.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Failed to spawn the interpreter.
    #[error("failed to spawn python: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// Interpreter binary not found.
    #[error("python interpreter not found at: {0}")]
    NotFound(Utf8PathBuf),

    /// Failed to write the program to a temporary file.
    #[error("failed to write program file: {0}")]
    WriteFailed(String),

    /// The program exited with an error.
    #[error("{message}")]
    Failed {
        /// The exception line of the traceback.
        message: String,
        /// Line of the generated program the error was raised on.
        line: Option<u32>,
        /// Interpreter exit code.
        code: i32,
        /// Everything the interpreter wrote to stderr.
        stderr: String,
    },
}

/// Runs generated Python programs.
pub trait Executor {
    /// Runs `code` to completion. stdin and stdout belong to the program.
    fn execute(&self, code: &str) -> impl Future<Output = Result<(), ExecutionError>> + Send;
}

/// Runs programs with a CPython interpreter.
#[derive(Debug, Clone)]
pub struct PythonRunner {
    /// Path to the interpreter.
    python_path: Utf8PathBuf,
    /// Arguments passed before the program path.
    args: Vec<String>,
}

impl PythonRunner {
    /// Creates a new runner.
    pub fn new(python_path: Utf8PathBuf, args: Vec<String>) -> Self {
        Self { python_path, args }
    }

    pub fn python_path(&self) -> &Utf8Path {
        &self.python_path
    }

    /// Attempts to find an interpreter.
    ///
    /// Search order:
    /// 1. `.venv` in the workspace
    /// 2. `venv` in the workspace
    /// 3. `python3` on PATH
    /// 4. `python` on PATH
    pub fn find_python(workspace_root: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
        if let Some(workspace) = workspace_root {
            for venv in [".venv", "venv"] {
                let candidate = workspace.join(venv).join(venv_python());
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }

        ["python3", "python"].into_iter().find_map(|name| {
            which::which(name)
                .ok()
                .and_then(|path| Utf8PathBuf::try_from(path).ok())
        })
    }

    /// Resolves the interpreter to use.
    ///
    /// A configured interpreter wins; it may be a path (with `~` expansion)
    /// or a command name looked up on PATH.
    pub fn resolve(
        configured: Option<&str>,
        workspace_root: Option<&Utf8Path>,
    ) -> Result<Utf8PathBuf, ExecutionError> {
        let Some(configured) = configured else {
            return Self::find_python(workspace_root)
                .ok_or_else(|| ExecutionError::NotFound(Utf8PathBuf::from("python3")));
        };

        let expanded = shellexpand::tilde(configured);
        let path = Utf8Path::new(expanded.as_ref());
        if path.exists() {
            return Ok(path.to_owned());
        }

        which::which(path.as_str())
            .ok()
            .and_then(|found| Utf8PathBuf::try_from(found).ok())
            .ok_or_else(|| ExecutionError::NotFound(path.to_owned()))
    }

    /// Gets the interpreter version, e.g. `Python 3.12.1`.
    pub async fn get_python_version(&self) -> Result<String, ExecutionError> {
        let output = Command::new(&self.python_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(ExecutionError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExecutionError::Failed {
                message: stderr.trim().to_string(),
                line: None,
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.to_string(),
            });
        }

        // Python 2 printed the version on stderr.
        let mut version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            version = String::from_utf8_lossy(&output.stderr).trim().to_string();
        }
        Ok(version)
    }
}

impl Executor for PythonRunner {
    async fn execute(&self, code: &str) -> Result<(), ExecutionError> {
        let mut program = tempfile::Builder::new()
            .prefix("pypp-")
            .suffix(".py")
            .tempfile()
            .map_err(|e| ExecutionError::WriteFailed(e.to_string()))?;
        program
            .write_all(code.as_bytes())
            .and_then(|()| program.flush())
            .map_err(|e| ExecutionError::WriteFailed(e.to_string()))?;

        let program_path = program.path().to_string_lossy().into_owned();
        tracing::debug!(python = %self.python_path, program = %program_path, "running program");

        let output = Command::new(&self.python_path)
            .args(&self.args)
            .arg(&program_path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if output.status.success() {
            // Warnings the program printed still belong to the user.
            eprint!("{stderr}");
            return Ok(());
        }

        let code = output.status.code().unwrap_or(-1);
        let (message, line) = match parse_traceback(&stderr, &program_path) {
            Some(traceback) => (traceback.message, traceback.line),
            None => (format!("python exited with code {code}"), None),
        };
        tracing::debug!(code, ?line, "program failed");

        Err(ExecutionError::Failed {
            message,
            line,
            code,
            stderr,
        })
    }
}

/// Interpreter path inside a virtual environment.
fn venv_python() -> &'static str {
    if cfg!(windows) {
        "Scripts/python.exe"
    } else {
        "bin/python"
    }
}
