//! Python traceback parser.

/// The parts of a Python traceback pypp reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traceback {
    /// The final `Type: message` line.
    pub message: String,
    /// Innermost line of the program file, 1-based.
    pub line: Option<u32>,
}

/// Parses interpreter stderr for a failed run of `program`.
///
/// Tracebacks look like this (syntax errors omit the `, in ...` part):
///
/// ```text
/// Traceback (most recent call last):
///   File "/tmp/pypp-x.py", line 5, in <module>
///     main()
/// ValueError: bad input
/// ```
pub fn parse_traceback(stderr: &str, program: &str) -> Option<Traceback> {
    let mut line = None;
    let mut message = None;

    for text in stderr.lines() {
        if let Some((file, number)) = parse_frame(text) {
            if file == program {
                line = Some(number);
            }
            continue;
        }

        // Source excerpts and carets are indented; the exception line is not.
        let trimmed = text.trim_end();
        if !trimmed.is_empty() && !trimmed.starts_with(char::is_whitespace) {
            message = Some(trimmed);
        }
    }

    let message = message?;
    if message.starts_with("Traceback (most recent call last)") {
        return None;
    }

    Some(Traceback {
        message: message.to_string(),
        line,
    })
}

/// Parses `  File "<path>", line <n>[, in <name>]`.
fn parse_frame(text: &str) -> Option<(&str, u32)> {
    let rest = text.trim_start().strip_prefix("File \"")?;
    let (file, rest) = rest.split_once("\", line ")?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let number = rest[..digits].parse().ok()?;
    Some((file, number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROGRAM: &str = "/tmp/pypp-abc.py";

    #[test]
    fn test_runtime_error() {
        let stderr = r#"Traceback (most recent call last):
  File "/tmp/pypp-abc.py", line 7, in <module>
    main()
  File "/tmp/pypp-abc.py", line 3, in main
    raise ValueError("bad input")
ValueError: bad input
"#;
        assert_eq!(
            parse_traceback(stderr, PROGRAM),
            Some(Traceback {
                message: "ValueError: bad input".to_string(),
                line: Some(3),
            })
        );
    }

    #[test]
    fn test_frames_outside_program_are_ignored() {
        let stderr = r#"Traceback (most recent call last):
  File "/tmp/pypp-abc.py", line 2, in <module>
    json.loads("{")
  File "/usr/lib/python3.12/json/__init__.py", line 346, in loads
    return _default_decoder.decode(s)
json.decoder.JSONDecodeError: Expecting property name enclosed in double quotes: line 1 column 2 (char 1)
"#;
        let traceback = parse_traceback(stderr, PROGRAM).unwrap();
        assert_eq!(traceback.line, Some(2));
        assert!(traceback.message.starts_with("json.decoder.JSONDecodeError"));
    }

    #[test]
    fn test_syntax_error() {
        let stderr = r#"  File "/tmp/pypp-abc.py", line 4
    x = = 1
        ^
SyntaxError: invalid syntax
"#;
        assert_eq!(
            parse_traceback(stderr, PROGRAM),
            Some(Traceback {
                message: "SyntaxError: invalid syntax".to_string(),
                line: Some(4),
            })
        );
    }

    #[test]
    fn test_no_traceback() {
        assert_eq!(parse_traceback("", PROGRAM), None);
        assert_eq!(
            parse_traceback("Killed\n", PROGRAM),
            Some(Traceback {
                message: "Killed".to_string(),
                line: None,
            })
        );
    }
}
