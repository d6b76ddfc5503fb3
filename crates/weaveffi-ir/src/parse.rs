//! IDL front ends.
//!
//! The same [`Api`] model can be written as TOML, JSON or YAML. Errors carry
//! the 1-based source position so the CLI can point at the offending line.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{ParseError, Result};
use crate::ir::Api;

/// Supported IDL encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlFormat {
    Toml,
    Json,
    Yaml,
}

impl IdlFormat {
    /// Resolve a format from its name (`toml`, `json`, `yaml`/`yml`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Resolve a format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }
}

/// Parse an API from a string in the named format.
pub fn parse_api_str(input: &str, format: &str) -> Result<Api> {
    let format = IdlFormat::from_name(format)
        .ok_or_else(|| ParseError::UnsupportedFormat(format.to_string()))?;
    parse_with(input, format)
}

/// Read and parse an API file, choosing the format from its extension.
pub fn load_api(path: &Path) -> Result<Api> {
    let format = IdlFormat::from_path(path).ok_or_else(|| {
        ParseError::UnsupportedFormat(
            path.extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| "<none>".to_string()),
        )
    })?;
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_with(&content, format)
}

/// Parse an API from a string in an already-resolved format.
pub fn parse_with(input: &str, format: IdlFormat) -> Result<Api> {
    from_str_format::<Api>(input, format)
}

fn from_str_format<T: DeserializeOwned>(input: &str, format: IdlFormat) -> Result<T> {
    match format {
        IdlFormat::Toml => toml::from_str(input).map_err(|e| {
            let (line, column) = e
                .span()
                .map(|span| line_column(input, span.start))
                .unwrap_or((0, 0));
            ParseError::Toml {
                line,
                column,
                message: e.message().to_string(),
            }
        }),
        IdlFormat::Json => serde_json::from_str(input).map_err(|e| ParseError::Json {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }),
        IdlFormat::Yaml => serde_yml::from_str(input).map_err(|e| {
            let (line, column) = e
                .location()
                .map(|loc| (loc.line(), loc.column()))
                .unwrap_or((0, 0));
            ParseError::Yaml {
                line,
                column,
                message: e.to_string(),
            }
        }),
    }
}

/// Convert a byte offset into a 1-based (line, column) pair.
fn line_column(input: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let before = &input.as_bytes()[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0);
    let column = String::from_utf8_lossy(&before[line_start..]).chars().count() + 1;
    (line, column)
}
