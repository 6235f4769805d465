//! These tests need a Python interpreter and are skipped without one.

use python_runner::{ExecutionError, Executor, PythonRunner};

fn runner() -> Option<PythonRunner> {
    let python = PythonRunner::find_python(None)?;
    Some(PythonRunner::new(python, Vec::new()))
}

#[tokio::test]
async fn test_successful_program() {
    let Some(runner) = runner() else {
        eprintln!("skipping: no python interpreter found");
        return;
    };

    runner.execute("x = 1\nassert x == 1\n").await.unwrap();
}

#[tokio::test]
async fn test_runtime_error_reports_program_line() {
    let Some(runner) = runner() else {
        eprintln!("skipping: no python interpreter found");
        return;
    };

    let err = runner
        .execute("def f():\n    raise ValueError('bad')\nf()\n")
        .await
        .unwrap_err();

    match err {
        ExecutionError::Failed {
            message, line, code, ..
        } => {
            assert_eq!(message, "ValueError: bad");
            assert_eq!(line, Some(2));
            assert_ne!(code, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_syntax_error_reports_program_line() {
    let Some(runner) = runner() else {
        eprintln!("skipping: no python interpreter found");
        return;
    };

    let err = runner.execute("x = 1\ny = = 2\n").await.unwrap_err();
    match err {
        ExecutionError::Failed { message, line, .. } => {
            assert!(message.starts_with("SyntaxError"), "{message}");
            assert_eq!(line, Some(2));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_version() {
    let Some(runner) = runner() else {
        eprintln!("skipping: no python interpreter found");
        return;
    };

    let version = runner.get_python_version().await.unwrap();
    assert!(version.starts_with("Python "), "{version}");
}
