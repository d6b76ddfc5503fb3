//! IDL parse error types.

use std::path::PathBuf;

/// Errors that can occur while reading an interface definition.
///
/// Line and column are 1-based. A value of `0` means the underlying parser
/// did not report a position.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The requested format is not one of `toml`, `json`, `yaml`.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("TOML parse error at line {line}, column {column}: {message}")]
    Toml {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("JSON parse error at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("YAML parse error at line {line}, column {column}: {message}")]
    Yaml {
        line: usize,
        column: usize,
        message: String,
    },

    /// The IDL file could not be read.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Source position of the failure, if the parser reported one.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Toml { line, column, .. }
            | Self::Json { line, column, .. }
            | Self::Yaml { line, column, .. }
                if *line > 0 =>
            {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}

/// Result type alias for IDL parsing.
pub type Result<T> = std::result::Result<T, ParseError>;
