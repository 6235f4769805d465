//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};

/// Run Python written with braces and semicolons.
#[derive(Debug, Parser)]
#[command(name = "pypp")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Files or directories to transpile and run
    #[arg(required_unless_present = "python_version")]
    pub paths: Vec<Utf8PathBuf>,

    /// Print the generated Python for each file
    #[arg(long)]
    pub emit: bool,

    /// Transpile only, do not run anything
    #[arg(long = "no-run")]
    pub no_run: bool,

    /// Python interpreter to run programs with
    #[arg(long)]
    pub python: Option<String>,

    /// Diagnostics format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Exit with error on warnings
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,

    /// Path to pypp.json
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Glob patterns to skip when walking directories
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Show the Python version and interpreter path
    #[arg(long = "python-version")]
    pub python_version: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output on stderr
    Human,
    /// JSON array of diagnostics on stdout
    Json,
}

impl Args {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
