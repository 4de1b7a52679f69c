//! Error types for the Arbor system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! [`SyntaxError`] is the reader-level failure shared by the lexer and the
//! argument parsers; [`Error`] is what public entry points return.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::reader::StringReader;
use crate::text::{PlainRenderer, Text, TextRenderer};
use crate::types::Type;

/// The main error type for Arbor operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a parse error from an already formatted message.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse {
            message: message.into(),
        })
    }

    /// Creates an execution error raised by a command handler.
    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Execution {
            message: message.into(),
        })
    }

    /// Creates a reflection error.
    #[must_use]
    pub fn reflection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reflection {
            message: message.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Returns the syntax error if this error wraps one.
    #[must_use]
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match &self.kind {
            ErrorKind::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SyntaxError> for Error {
    fn from(e: SyntaxError) -> Self {
        Self::new(ErrorKind::Syntax(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(e))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Lexical or grammatical error in command source. The message already
    /// contains the caret-annotated source line.
    #[error("{message}")]
    Parse {
        /// Formatted message.
        message: String,
    },

    /// The command source could not be obtained (loader miss, bad `file =`
    /// header, preprocessor failure).
    #[error("Error getting command input for {command}: {message}")]
    Input {
        /// Handler the input was requested for.
        command: String,
        /// What went wrong.
        message: String,
    },

    /// Semantic compilation produced at least one fatal diagnostic.
    #[error("{report}")]
    Compilation {
        /// Name of the command being compiled.
        command: String,
        /// Full multi-diagnostic report.
        report: String,
        /// Number of fatal diagnostics.
        errors: usize,
        /// Number of warnings.
        warnings: usize,
    },

    /// Reader or dispatch syntax error.
    #[error(transparent)]
    Syntax(SyntaxError),

    /// A command handler reported a failure.
    #[error("command failed: {message}")]
    Execution {
        /// Handler-supplied message.
        message: String,
    },

    /// A variable key is not identifier-shaped.
    #[error("invalid variable name: {message}")]
    InvalidVariableName {
        /// Why the key was rejected.
        message: String,
    },

    /// An argument type name is registered twice.
    #[error("Type '{0}' is already registered")]
    DuplicateType(String),

    /// A value did not have the type an operation required.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// Dynamic member access failed at call time.
    #[error("reflection error: {message}")]
    Reflection {
        /// Description of the failure.
        message: String,
    },

    /// I/O failure while loading command input.
    #[error("io error: {0}")]
    Io(std::io::Error),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Command the error belongs to.
    pub command: Option<String>,
    /// Byte offset in the relevant input.
    pub position: Option<usize>,
    /// Frames describing what was being done, innermost last.
    pub frames: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the command name.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Sets the input position.
    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(command) = &self.command {
            write!(f, "in command '{command}'")?;
        }
        if let Some(position) = self.position {
            write!(f, " at {position}")?;
        }
        for frame in self.frames.iter().rev() {
            write!(f, "\n  while {frame}")?;
        }
        Ok(())
    }
}

/// How many characters of input precede the `<--[HERE]` marker.
const CONTEXT_AMOUNT: usize = 10;

/// A failure while reading input, positioned at a cursor.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    message: Text,
    input: Option<Arc<str>>,
    cursor: Option<usize>,
}

impl SyntaxError {
    /// Creates an error without input context.
    #[must_use]
    pub fn new(message: Text) -> Self {
        Self {
            message,
            input: None,
            cursor: None,
        }
    }

    /// Attaches the reader's input and current cursor.
    #[must_use]
    pub fn at(self, reader: &StringReader) -> Self {
        self.at_cursor(reader.string(), reader.cursor())
    }

    /// Attaches input and an explicit cursor.
    #[must_use]
    pub fn at_cursor(mut self, input: &str, cursor: usize) -> Self {
        self.input = Some(input.into());
        self.cursor = Some(cursor);
        self
    }

    /// The structured message, without input context.
    #[must_use]
    pub fn message(&self) -> &Text {
        &self.message
    }

    /// Cursor the error occurred at, if known.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Input the error occurred in, if known.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// The few characters before the cursor followed by `<--[HERE]`.
    #[must_use]
    pub fn context(&self) -> Option<String> {
        let (input, cursor) = (self.input.as_deref()?, self.cursor?);
        let cursor = cursor.min(input.len());
        let before = &input[..cursor];
        let count = before.chars().count();
        let mut out = String::new();
        if count > CONTEXT_AMOUNT {
            out.push_str("...");
        }
        out.extend(before.chars().skip(count.saturating_sub(CONTEXT_AMOUNT)));
        out.push_str("<--[HERE]");
        Some(out)
    }

    /// Renders the message and context with `renderer`.
    #[must_use]
    pub fn render(&self, renderer: &dyn TextRenderer) -> String {
        let message = renderer.render_plain(&self.message);
        match self.context() {
            Some(context) => format!(
                "{message} at position {}: {context}",
                self.cursor.unwrap_or_default()
            ),
            None => message,
        }
    }

    fn builtin(key: &str, fallback: &str, args: Vec<Text>) -> Self {
        Self::new(Text::translatable_with(key, fallback, args))
    }

    /// A quoted string was expected but none started.
    #[must_use]
    pub fn expected_start_of_quote() -> Self {
        Self::builtin(
            "parsing.quote.expected.start",
            "Expected quote to start a string",
            Vec::new(),
        )
    }

    /// A quoted string was not closed.
    #[must_use]
    pub fn expected_end_of_quote() -> Self {
        Self::builtin(
            "parsing.quote.expected.end",
            "Unclosed quoted string",
            Vec::new(),
        )
    }

    /// A backslash escaped something other than a quote or backslash.
    #[must_use]
    pub fn invalid_escape(c: char) -> Self {
        Self::builtin(
            "parsing.quote.escape",
            "Invalid escape sequence '%s' in quoted string",
            vec![Text::plain(c.to_string())],
        )
    }

    /// A boolean was expected.
    #[must_use]
    pub fn expected_bool() -> Self {
        Self::builtin("parsing.bool.expected", "Expected boolean", Vec::new())
    }

    /// A word that is not `true` or `false`.
    #[must_use]
    pub fn invalid_bool(found: &str) -> Self {
        Self::builtin(
            "parsing.bool.invalid",
            "Invalid boolean, expected 'true' or 'false' but found '%s'",
            vec![Text::plain(found)],
        )
    }

    /// A number of the given kind (`int`, `long`, `float`, `double`) was
    /// expected.
    #[must_use]
    pub fn expected_number(kind: &str) -> Self {
        let (key, fallback) = match kind {
            "long" => ("parsing.long.expected", "Expected long"),
            "float" => ("parsing.float.expected", "Expected float"),
            "double" => ("parsing.double.expected", "Expected double"),
            _ => ("parsing.int.expected", "Expected integer"),
        };
        Self::builtin(key, fallback, Vec::new())
    }

    /// A number of the given kind could not be parsed.
    #[must_use]
    pub fn invalid_number(kind: &str, found: &str) -> Self {
        let (key, fallback) = match kind {
            "long" => ("parsing.long.invalid", "Invalid long '%s'"),
            "float" => ("parsing.float.invalid", "Invalid float '%s'"),
            "double" => ("parsing.double.invalid", "Invalid double '%s'"),
            _ => ("parsing.int.invalid", "Invalid integer '%s'"),
        };
        Self::builtin(key, fallback, vec![Text::plain(found)])
    }

    /// A number fell below its minimum.
    #[must_use]
    pub fn number_too_low(kind: &str, min: &str, found: &str) -> Self {
        Self::builtin(
            &format!("argument.{kind}.low"),
            &format!("{} must not be less than %s, found %s", capitalize(kind)),
            vec![Text::plain(min), Text::plain(found)],
        )
    }

    /// A number exceeded its maximum.
    #[must_use]
    pub fn number_too_high(kind: &str, max: &str, found: &str) -> Self {
        Self::builtin(
            &format!("argument.{kind}.big"),
            &format!("{} must not be more than %s, found %s", capitalize(kind)),
            vec![Text::plain(max), Text::plain(found)],
        )
    }

    /// A specific character was expected.
    #[must_use]
    pub fn expected_symbol(symbol: char) -> Self {
        Self::builtin(
            "parsing.expected",
            "Expected '%s'",
            vec![Text::plain(symbol.to_string())],
        )
    }

    /// No command matched the input.
    #[must_use]
    pub fn unknown_command() -> Self {
        Self::builtin("command.unknown.command", "Unknown command", Vec::new())
    }

    /// An argument did not match any child node.
    #[must_use]
    pub fn unknown_argument() -> Self {
        Self::builtin(
            "command.unknown.argument",
            "Incorrect argument for command",
            Vec::new(),
        )
    }

    /// An argument was followed by something other than a space.
    #[must_use]
    pub fn expected_separator() -> Self {
        Self::builtin(
            "command.expected.separator",
            "Expected whitespace to end one argument, but found trailing data",
            Vec::new(),
        )
    }

    /// A literal was expected.
    #[must_use]
    pub fn expected_literal(literal: &str) -> Self {
        Self::builtin(
            "argument.literal.incorrect",
            "Expected literal %s",
            vec![Text::plain(literal)],
        )
    }

    /// A word was not one of the allowed choices or map keys.
    #[must_use]
    pub fn invalid_choice(found: &str) -> Self {
        Self::builtin(
            "argument.enum.invalid",
            "Invalid value \"%s\"",
            vec![Text::plain(found)],
        )
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&PlainRenderer))
    }
}

impl std::error::Error for SyntaxError {}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
