use std::fmt;

use swc_core::common::errors::HANDLER;
use thiserror::Error;

/// Rejected configuration. Raised before any traversal starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target call path must not be empty")]
    EmptyPath,

    #[error("target call path `{path}` contains an empty segment")]
    EmptySegment { path: String },

    #[error("target call path `{path}` has invalid segment `{segment}`")]
    InvalidSegment { path: String, segment: String },

    #[error("target call path `{path}`: `*` is only allowed as the last segment")]
    MisplacedWildcard { path: String },

    #[error("target call path `*` needs at least one named segment before the wildcard")]
    BareWildcard,

    #[error("invalid plugin config: {0}")]
    Json(String),
}

/// Syntax error reported by the parser, with a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError at {}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to emit code: {0}")]
    Emit(#[from] std::io::Error),

    #[error("emitted code is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Reports a configuration problem through the host compiler's diagnostics.
///
/// Only valid inside a plugin invocation, where the host has set `HANDLER`.
pub fn report_config_error(err: &ConfigError) {
    HANDLER.with(|handler| {
        handler.err(&format!("[elide-calls] {err}"));
    });
}
