//! Configuration loading.

use camino::{Utf8Path, Utf8PathBuf};
use pypp_transpiler::TranspileOptions;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "pypp.json";

/// Extension accepted when the config names none.
const DEFAULT_EXTENSION: &str = ".pypp";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid JSON for this schema.
    #[error("invalid config {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

/// Contents of `pypp.json`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PyppConfig {
    /// Interpreter path or command name.
    pub python: Option<String>,

    /// Arguments passed to the interpreter before the program.
    #[serde(default)]
    pub python_args: Vec<String>,

    /// File extensions to collect from directories.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Print generated Python.
    pub emit: Option<bool>,

    /// Exit with error on warnings.
    pub fail_on_warnings: Option<bool>,

    /// Fill empty blocks with `pass`.
    pub fill_empty_blocks: Option<bool>,

    /// Read `{` after `=`, `(`, `[`, `,` or `return` as a dict or set.
    pub data_literals: Option<bool>,
}

impl PyppConfig {
    /// Loads configuration from a file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Parses configuration text. `//` and `/* */` comments are allowed.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&remove_json_comments(content))
    }

    /// Finds and loads `pypp.json` in `dir`.
    pub fn find(dir: &Utf8Path) -> Result<Option<(Utf8PathBuf, Self)>, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let config = Self::load(&path)?;
        Ok(Some((path, config)))
    }

    /// Returns the file extensions to process.
    pub fn file_extensions(&self) -> Vec<&str> {
        if self.extensions.is_empty() {
            vec![DEFAULT_EXTENSION]
        } else {
            self.extensions.iter().map(|s| s.as_str()).collect()
        }
    }

    /// Transpiler options, with defaults for unset keys.
    pub fn transpile_options(&self) -> TranspileOptions {
        let defaults = TranspileOptions::default();
        TranspileOptions {
            fill_empty_blocks: self.fill_empty_blocks.unwrap_or(defaults.fill_empty_blocks),
            data_literals: self.data_literals.unwrap_or(defaults.data_literals),
        }
    }
}

/// Blanks out `//` and `/* */` comments outside JSON strings.
///
/// Newlines inside comments are kept so parse errors point at the right line.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            match c {
                '"' => in_string = false,
                '\\' => result.extend(chars.next()),
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                while chars.next_if(|&next| next != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                while let Some(next) = chars.next() {
                    if next == '*' && chars.next_if_eq(&'/').is_some() {
                        break;
                    }
                    if next == '\n' {
                        result.push('\n');
                    }
                }
            }
            _ => result.push(c),
        }
    }

    result
}
