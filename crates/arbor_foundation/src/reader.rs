//! Cursor-based character reader.
//!
//! Shared by the grammar lexer (quoted strings, unquoted words) and by the
//! dispatcher's argument types (numbers, booleans, words). Cursors are byte
//! offsets into the input and always sit on a `char` boundary.

use std::sync::Arc;

use crate::error::SyntaxError;

/// Result alias for reader operations.
pub type ReadResult<T> = std::result::Result<T, SyntaxError>;

const ESCAPE: char = '\\';
const DOUBLE_QUOTE: char = '"';
const SINGLE_QUOTE: char = '\'';

/// Reads an input string with a movable cursor.
#[derive(Clone, Debug)]
pub struct StringReader {
    string: Arc<str>,
    cursor: usize,
}

impl StringReader {
    /// Creates a reader positioned at the start of `input`.
    #[must_use]
    pub fn new(input: impl Into<Arc<str>>) -> Self {
        Self {
            string: input.into(),
            cursor: 0,
        }
    }

    /// The whole input.
    #[must_use]
    pub fn string(&self) -> &str {
        &self.string
    }

    /// Current byte offset.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor. Offsets past the end clamp to the end.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.string.len());
    }

    /// Total input length in bytes.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.string.len()
    }

    /// Input consumed so far.
    #[must_use]
    pub fn read(&self) -> &str {
        &self.string[..self.cursor]
    }

    /// Input not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &str {
        &self.string[self.cursor..]
    }

    /// Returns true if at least one more character is available.
    #[must_use]
    pub fn can_read(&self) -> bool {
        self.cursor < self.string.len()
    }

    /// The next character, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// The character `offset` characters ahead, without consuming anything.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Consumes and returns the next character.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    /// Skips one character.
    pub fn skip(&mut self) {
        self.next_char();
    }

    /// Returns true if the remaining input starts with `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.remaining().starts_with(prefix)
    }

    /// Skips Unicode whitespace.
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.skip();
        }
    }

    /// Characters allowed inside a number literal.
    #[must_use]
    pub const fn is_allowed_number(c: char) -> bool {
        c.is_ascii_digit() || c == '.' || c == '-'
    }

    /// Characters that open a quoted string.
    #[must_use]
    pub const fn is_quoted_string_start(c: char) -> bool {
        c == DOUBLE_QUOTE || c == SINGLE_QUOTE
    }

    /// Characters allowed in an unquoted string.
    #[must_use]
    pub const fn is_allowed_in_unquoted_string(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &str {
        let start = self.cursor;
        while self.peek().is_some_and(&pred) {
            self.skip();
        }
        &self.string[start..self.cursor]
    }

    /// Reads a run of unquoted-string characters. May be empty.
    pub fn read_unquoted_string(&mut self) -> &str {
        self.take_while(Self::is_allowed_in_unquoted_string)
    }

    /// Reads a quoted string, starting at the opening quote.
    ///
    /// # Errors
    /// Fails if no quote starts the string, an escape is invalid, or the
    /// string is not closed.
    pub fn read_quoted_string(&mut self) -> ReadResult<String> {
        match self.peek() {
            None => Ok(String::new()),
            Some(q) if Self::is_quoted_string_start(q) => {
                self.skip();
                self.read_string_until(q)
            }
            Some(_) => Err(SyntaxError::expected_start_of_quote().at(self)),
        }
    }

    /// Reads up to an unescaped `terminator`, consuming it.
    ///
    /// # Errors
    /// Fails on an invalid escape or when the input ends first.
    pub fn read_string_until(&mut self, terminator: char) -> ReadResult<String> {
        let mut result = String::new();
        let mut escaped = false;
        while let Some(c) = self.next_char() {
            if escaped {
                if c == terminator || c == ESCAPE {
                    result.push(c);
                    escaped = false;
                } else {
                    self.cursor -= c.len_utf8();
                    return Err(SyntaxError::invalid_escape(c).at(self));
                }
            } else if c == ESCAPE {
                escaped = true;
            } else if c == terminator {
                return Ok(result);
            } else {
                result.push(c);
            }
        }
        Err(SyntaxError::expected_end_of_quote().at(self))
    }

    /// Reads a quoted or unquoted string.
    ///
    /// # Errors
    /// Propagates quoted-string failures.
    pub fn read_string(&mut self) -> ReadResult<String> {
        match self.peek() {
            Some(q) if Self::is_quoted_string_start(q) => {
                self.skip();
                self.read_string_until(q)
            }
            _ => Ok(self.read_unquoted_string().to_string()),
        }
    }

    /// Reads `true` or `false`.
    ///
    /// # Errors
    /// Fails on empty input or any other word.
    pub fn read_bool(&mut self) -> ReadResult<bool> {
        let start = self.cursor;
        let value = self.read_string()?;
        match value.as_str() {
            "" => Err(SyntaxError::expected_bool().at(self)),
            "true" => Ok(true),
            "false" => Ok(false),
            other => {
                let err = SyntaxError::invalid_bool(other);
                self.cursor = start;
                Err(err.at(self))
            }
        }
    }

    fn read_number_token(&mut self) -> &str {
        self.take_while(Self::is_allowed_number)
    }

    fn read_number<T: std::str::FromStr>(&mut self, kind: &str) -> ReadResult<T> {
        let start = self.cursor;
        let token = self.read_number_token().to_string();
        if token.is_empty() {
            return Err(SyntaxError::expected_number(kind).at(self));
        }
        token.parse::<T>().map_err(|_| {
            self.cursor = start;
            SyntaxError::invalid_number(kind, &token).at(self)
        })
    }

    /// Reads a 32-bit integer.
    ///
    /// # Errors
    /// Fails if no number is present or it does not parse.
    pub fn read_int(&mut self) -> ReadResult<i32> {
        self.read_number("int")
    }

    /// Reads a 64-bit integer.
    ///
    /// # Errors
    /// Fails if no number is present or it does not parse.
    pub fn read_long(&mut self) -> ReadResult<i64> {
        self.read_number("long")
    }

    /// Reads a 32-bit float.
    ///
    /// # Errors
    /// Fails if no number is present or it does not parse.
    pub fn read_float(&mut self) -> ReadResult<f32> {
        self.read_number("float")
    }

    /// Reads a 64-bit float.
    ///
    /// # Errors
    /// Fails if no number is present or it does not parse.
    pub fn read_double(&mut self) -> ReadResult<f64> {
        self.read_number("double")
    }

    /// Consumes `c` or fails.
    ///
    /// # Errors
    /// Fails if the next character is not `c`.
    pub fn expect(&mut self, c: char) -> ReadResult<()> {
        if self.peek() == Some(c) {
            self.skip();
            Ok(())
        } else {
            Err(SyntaxError::expected_symbol(c).at(self))
        }
    }
}
