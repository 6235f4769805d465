//! Python interpreter runner for transpiled pypp programs.
//!
//! Programs are written to a temporary `.py` file and run by a CPython
//! interpreter found in the workspace virtual environment or on `PATH`
//! (see [`PythonRunner::find_python`]). When a program fails, its traceback
//! is reduced to the exception message and the innermost line of the
//! program, which callers map back to pypp source lines.
//!
//! # Example
//!
//! ```ignore
//! use python_runner::{Executor, PythonRunner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let python = PythonRunner::resolve(None, None).unwrap();
//!     let runner = PythonRunner::new(python, Vec::new());
//!
//!     if let Err(err) = runner.execute("print('hello')").await {
//!         eprintln!("Error: {err}");
//!     }
//! }
//! ```

mod runner;
mod traceback;

pub use runner::{ExecutionError, Executor, PythonRunner};
pub use traceback::{parse_traceback, Traceback};
