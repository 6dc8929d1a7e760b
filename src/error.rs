//! Structured error types for the statement renderer.
//!
//! Every variant is fatal for a run: the binary prints it and exits non-zero.
//! The library still returns them as values so that layout code can be
//! exercised from tests without tearing down the test process.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum StatementError {
    /// Statement or config JSON failed to parse.
    #[error("Failed to parse {what}: {source}{}", hint_suffix(.hint))]
    Parse {
        what: &'static str,
        source: serde_json::Error,
        hint: String,
    },
    /// An input could not be read or the output could not be written.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// A font could not be registered, measured, or embedded.
    #[error("Font error: {0}")]
    Font(String),
    /// An image could not be read or decoded.
    #[error("Image error: {0}")]
    Image(String),
    /// The footer QR payload could not be encoded.
    #[error("QR code error: {0}")]
    Qr(String),
    /// A layout contract was violated by the caller.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Programmer-contract violations raised by the layout helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("a table row takes five values plus an optional continuation, got {0}")]
    RowArity(usize),
    #[error("column layout must be set before writing rows")]
    ColumnsNotSet,
}

pub type Result<T> = std::result::Result<T, StatementError>;

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl StatementError {
    /// Wrap a serde_json error with a hint derived from its category.
    pub fn parse(what: &'static str, e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but a field has the wrong type. Amounts must be numbers and house_no an integer.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the file truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        StatementError::Parse {
            what,
            source: e,
            hint,
        }
    }

    /// An I/O failure on `path`.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StatementError::Io {
            path: path.into(),
            source,
        }
    }
}
