//! Caret-annotated error messages.
//!
//! ```text
//! Expected assign, found identifier
//! name greet
//!      ^ Line 1 Column 6
//! ```

use thiserror::Error;

/// A fatal lexing or parsing failure.
#[derive(Clone, Debug, Error)]
#[error("{formatted}")]
pub struct ParseError {
    message: String,
    position: Option<usize>,
    formatted: String,
}

impl ParseError {
    /// Creates an error, formatting it against `input`.
    #[must_use]
    pub fn new(input: &str, position: Option<usize>, message: impl Into<String>) -> Self {
        let message = message.into();
        let formatted = format_error(input, position, &message);
        Self {
            message,
            position,
            formatted,
        }
    }

    /// The bare message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte offset the error points at.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Message with source context.
    #[must_use]
    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

impl From<ParseError> for arbor_foundation::Error {
    fn from(e: ParseError) -> Self {
        let context = e
            .position
            .map(|p| arbor_foundation::ErrorContext::new().with_position(p));
        let error = Self::parse(e.formatted);
        match context {
            Some(context) => error.with_context(context),
            None => error,
        }
    }
}

/// Result type for lexing and parsing.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Formats `message` with the line containing `position` and a caret under
/// it. Without a position the message is returned unchanged.
///
/// The shown line has surrounding whitespace trimmed; line and column are
/// 1-based.
#[must_use]
pub fn format_error(input: &str, position: Option<usize>, message: &str) -> String {
    let Some(position) = position else {
        return message.to_string();
    };
    let mut pos = position.min(input.len());
    while !input.is_char_boundary(pos) {
        pos -= 1;
    }

    let mut line_start = input[..pos].rfind(['\n', '\r']).map_or(0, |i| i + 1);
    let line_end = input[pos..]
        .find(['\n', '\r'])
        .map_or(input.len(), |i| pos + i);

    let indent = input[line_start..pos].len() - input[line_start..pos].trim_start().len();
    line_start += indent;
    let line = input[line_start..line_end].trim_end();

    let column = input[line_start..pos].chars().count();
    let line_number = input[..pos].matches('\n').count() + 1;

    format!(
        "{message}\n{line}\n{caret:>width$} Line {line_number} Column {col}",
        caret = "^",
        width = column + 1,
        col = column + 1,
    )
}
