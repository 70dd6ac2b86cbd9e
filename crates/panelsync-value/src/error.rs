//! Parse error for malformed JSON text

/// Longest excerpt of offending text shown in the error message
const EXCERPT_LEN: usize = 80;

/// Malformed JSON input
///
/// Always carries the full offending text so callers can report it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed JSON ({message}) in `{}`", excerpt(.text))]
pub struct ParseError {
    /// Parser message, including line and column
    pub message: String,

    /// The text that failed to parse
    pub text: String,
}

impl ParseError {
    /// Create parse error for text
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            text: text.into(),
        }
    }

    /// Create from a serde_json error
    #[inline]
    #[must_use]
    pub fn from_json(err: &serde_json::Error, text: &str) -> Self {
        Self::new(err.to_string(), text)
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_LEN {
        return text.to_string();
    }
    let mut short: String = text.chars().take(EXCERPT_LEN).collect();
    short.push_str("...");
    short
}
