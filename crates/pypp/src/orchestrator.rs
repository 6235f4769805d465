//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::{ConfigError, PyppConfig};
use crate::output::{FormattedDiagnostic, Formatter, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use pypp_transpiler::{transpile_with_options, TranspileResult};
use python_runner::{ExecutionError, Executor, PythonRunner};
use rayon::prelude::*;
use std::fs;
use std::io::Write;
use thiserror::Error;
use walkdir::WalkDir;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to read a file or the working directory.
    #[error("failed to read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// Bad config file.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A file argument with an extension that is not accepted.
    #[error("Only {} files are supported.", .0.join(", "))]
    UnsupportedExtension(Vec<String>),

    /// A path argument that does not exist.
    #[error("File not found: {0}")]
    FileNotFound(Utf8PathBuf),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Directory walk failed.
    #[error("failed to walk {path}: {message}")]
    Walk { path: Utf8PathBuf, message: String },

    /// Interpreter lookup or startup failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// A read and transpiled input file.
struct Transpiled {
    path: Utf8PathBuf,
    source: String,
    result: TranspileResult,
}

/// Runs transpilation and execution for every input.
pub async fn run(args: Args) -> Result<RunSummary, CliError> {
    let cwd = current_dir()?;
    let config = load_config(&args, &cwd)?;

    let fail_on_warnings = args.fail_on_warnings || config.fail_on_warnings.unwrap_or(false);
    let emit = args.emit || config.emit.unwrap_or(false);
    let options = config.transpile_options();

    let ignore_set = build_ignore_set(&args.ignore)?;
    let files = collect_files(&args.paths, &config.file_extensions(), &ignore_set)?;
    tracing::info!(files = files.len(), "collected input files");

    let sources = files
        .into_iter()
        .map(|path| {
            let source = fs::read_to_string(&path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            Ok((path, source))
        })
        .collect::<Result<Vec<_>, CliError>>()?;

    let transpiled: Vec<Transpiled> = sources
        .into_par_iter()
        .map(|(path, source)| {
            let result = transpile_with_options(&source, options);
            tracing::debug!(%path, warnings = result.warning_count(), "transpiled file");
            Transpiled {
                path,
                source,
                result,
            }
        })
        .collect();

    let mut summary = RunSummary {
        file_count: transpiled.len(),
        warning_count: transpiled.iter().map(|t| t.result.warning_count()).sum(),
        fail_on_warnings,
        ..Default::default()
    };

    let formatter = Formatter::new(args.output);
    if args.output == OutputFormat::Json {
        // One report before anything runs, so program output never splits it.
        let formatted: Vec<FormattedDiagnostic> = transpiled
            .iter()
            .flat_map(|t| {
                t.result
                    .diagnostics
                    .iter()
                    .map(|diag| FormattedDiagnostic::new(diag, &t.path))
            })
            .collect();
        println!("{}", Formatter::format_json(&formatted));
    }

    let runner = if args.no_run {
        None
    } else {
        let configured = args.python.as_deref().or(config.python.as_deref());
        let python_path = PythonRunner::resolve(configured, Some(cwd.as_path()))?;
        tracing::info!(python = %python_path, "using interpreter");
        Some(PythonRunner::new(python_path, config.python_args.clone()))
    };

    for file in &transpiled {
        if args.output == OutputFormat::Human && file.result.has_warnings() {
            eprint!(
                "{}",
                formatter.format(&file.result.diagnostics, &file.path, &file.source)
            );
        }

        if emit {
            println!("{}", file.result.code);
        }

        let Some(runner) = &runner else {
            continue;
        };

        flush_stdout();
        match runner.execute(&file.result.code).await {
            Ok(()) => summary.run_count += 1,
            Err(err) => {
                eprintln!("Error: {}", describe_failure(&err, file));
                summary.error_count += 1;
                break;
            }
        }
    }

    if args.output == OutputFormat::Human {
        eprintln!("{}", summary.format());
    }

    Ok(summary)
}

/// Resolves the interpreter and returns its version and path.
pub async fn python_version(args: &Args) -> Result<(String, Utf8PathBuf), CliError> {
    let cwd = current_dir()?;
    let config = load_config(args, &cwd)?;
    let configured = args.python.as_deref().or(config.python.as_deref());
    let python_path = PythonRunner::resolve(configured, Some(cwd.as_path()))?;
    let runner = PythonRunner::new(python_path.clone(), Vec::new());
    let version = runner.get_python_version().await?;
    Ok((version, python_path))
}

fn current_dir() -> Result<Utf8PathBuf, CliError> {
    std::env::current_dir()
        .and_then(|path| {
            Utf8PathBuf::try_from(path)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
        .map_err(|source| CliError::Io {
            path: Utf8PathBuf::from("."),
            source,
        })
}

/// Explicit `--config` first, then `pypp.json` in the working directory.
fn load_config(args: &Args, cwd: &Utf8Path) -> Result<PyppConfig, CliError> {
    if let Some(path) = &args.config {
        return Ok(PyppConfig::load(path)?);
    }
    match PyppConfig::find(cwd)? {
        Some((path, config)) => {
            tracing::info!(%path, "loaded config");
            Ok(config)
        }
        None => Ok(PyppConfig::default()),
    }
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, CliError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| CliError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| CliError::InvalidGlob(e.to_string()))
}

/// Expands path arguments into files, keeping argument order.
///
/// Files named directly must carry an accepted extension. Directories are
/// walked in file name order for accepted files not matched by `ignore_set`.
fn collect_files(
    paths: &[Utf8PathBuf],
    extensions: &[&str],
    ignore_set: &GlobSet,
) -> Result<Vec<Utf8PathBuf>, CliError> {
    let accepted = |path: &Utf8Path| {
        let file_name = path.file_name().unwrap_or("");
        extensions.iter().any(|ext| file_name.ends_with(ext))
    };

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| CliError::Walk {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(file) = Utf8PathBuf::try_from(entry.into_path()) else {
                    continue;
                };
                let relative = file.strip_prefix(path).unwrap_or(&file);
                if accepted(file.as_path()) && !ignore_set.is_match(relative.as_str()) {
                    files.push(file);
                }
            }
        } else if !accepted(path.as_path()) {
            return Err(CliError::UnsupportedExtension(
                extensions.iter().map(|ext| ext.to_string()).collect(),
            ));
        } else if !path.exists() {
            return Err(CliError::FileNotFound(path.clone()));
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

/// `message (file:line)` when the failing line maps back to the source.
fn describe_failure(err: &ExecutionError, file: &Transpiled) -> String {
    match err {
        ExecutionError::Failed {
            message,
            line: Some(line),
            ..
        } => match file.result.source_line(*line) {
            Some(source_line) => format!("{message} ({}:{source_line})", file.path),
            None => message.clone(),
        },
        other => other.to_string(),
    }
}

fn flush_stdout() {
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!(error = %e, "failed to flush stdout");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn workspace() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    fn touch(path: &Utf8Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x = 1;").unwrap();
    }

    #[test]
    fn test_collect_walks_directories_in_order() {
        let (_dir, root) = workspace();
        touch(&root.join("b.pypp"));
        touch(&root.join("a.pypp"));
        touch(&root.join("notes.txt"));
        touch(&root.join("lib/c.pypp"));

        let files = collect_files(
            &[root.clone()],
            &[".pypp"],
            &build_ignore_set(&[]).unwrap(),
        )
        .unwrap();
        assert_eq!(
            files,
            vec![
                root.join("a.pypp"),
                root.join("b.pypp"),
                root.join("lib/c.pypp")
            ]
        );
    }

    #[test]
    fn test_collect_respects_ignore() {
        let (_dir, root) = workspace();
        touch(&root.join("main.pypp"));
        touch(&root.join("build/gen.pypp"));

        let ignore = build_ignore_set(&["build/**".to_string()]).unwrap();
        let files = collect_files(&[root.clone()], &[".pypp"], &ignore).unwrap();
        assert_eq!(files, vec![root.join("main.pypp")]);
    }

    #[test]
    fn test_collect_rejects_other_extensions() {
        let (_dir, root) = workspace();
        let script = root.join("script.py");
        touch(&script);

        let err = collect_files(&[script], &[".pypp"], &GlobSet::empty()).unwrap_err();
        assert_eq!(err.to_string(), "Only .pypp files are supported.");
    }

    #[test]
    fn test_collect_missing_file() {
        let (_dir, root) = workspace();
        let missing = root.join("missing.pypp");

        let err = collect_files(&[missing.clone()], &[".pypp"], &GlobSet::empty()).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(path) if path == missing));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(matches!(
            build_ignore_set(&["[".to_string()]),
            Err(CliError::InvalidGlob(_))
        ));
    }

    #[test]
    fn test_describe_failure_maps_line() {
        let source = "/* header */\nfn main() {\n    fail();\n}\nmain();";
        let file = Transpiled {
            path: Utf8PathBuf::from("demo.pypp"),
            source: source.to_string(),
            result: pypp_transpiler::transpile(source),
        };
        let err = ExecutionError::Failed {
            message: "NameError: name 'fail' is not defined".to_string(),
            line: Some(2),
            code: 1,
            stderr: String::new(),
        };
        assert_eq!(
            describe_failure(&err, &file),
            "NameError: name 'fail' is not defined (demo.pypp:3)"
        );
    }

    #[test]
    fn test_describe_failure_without_line() {
        let file = Transpiled {
            path: Utf8PathBuf::from("demo.pypp"),
            source: String::new(),
            result: pypp_transpiler::transpile(""),
        };
        let err = ExecutionError::Failed {
            message: "Killed".to_string(),
            line: None,
            code: 137,
            stderr: String::new(),
        };
        assert_eq!(describe_failure(&err, &file), "Killed");
    }
}
