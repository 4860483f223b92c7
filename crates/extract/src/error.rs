use thiserror::Error;

/// Failure kinds of [`crate::json::extract`].
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No JSON found in response")]
    NotFound,

    #[error("Failed to parse JSON payload: {0}")]
    ParseFailure(#[source] serde_json::Error),
}

impl ExtractionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::NotFound => "not_found",
            ExtractionError::ParseFailure(_) => "parse_failure",
        }
    }
}

/// Why a backslash escape could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnescapeError {
    #[error("\\ at end of string")]
    TrailingBackslash,

    #[error("truncated \\{escape} escape at position {position}")]
    Truncated { escape: char, position: usize },

    #[error("escape at position {position} is not a valid code point")]
    InvalidCodePoint { position: usize },

    #[error("named unicode escape at position {position} is not supported")]
    NamedEscape { position: usize },
}
