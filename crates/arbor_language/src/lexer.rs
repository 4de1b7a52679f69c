//! Lexer for the command-tree grammar.
//!
//! Produces tokens lazily with one token of lookahead. Whitespace, `//` line
//! comments and `/* */` block comments are skipped between tokens.

use arbor_foundation::{StringReader, TextRenderer};

use crate::report::{ParseError, ParseResult};
use crate::span::{LineIndex, Span};
use crate::token::{Token, TokenKind, describe_kinds};

/// Tokenizes grammar input.
pub struct Lexer<'r> {
    reader: StringReader,
    renderer: &'r dyn TextRenderer,
    lines: LineIndex,
    peeked: Option<Token>,
    last_start: usize,
}

impl<'r> Lexer<'r> {
    /// Creates a lexer over `input`. Reader failures inside quoted strings
    /// are rendered to plain text with `renderer`.
    #[must_use]
    pub fn new(input: &str, renderer: &'r dyn TextRenderer) -> Self {
        Self {
            lines: LineIndex::new(input),
            reader: StringReader::new(input),
            renderer,
            peeked: None,
            last_start: 0,
        }
    }

    /// The whole input.
    #[must_use]
    pub fn input(&self) -> &str {
        self.reader.string()
    }

    /// Position of the most recently produced token, peeked ones included.
    #[must_use]
    pub const fn last_start(&self) -> usize {
        self.last_start
    }

    /// Builds an error at `position` formatted against the input.
    #[must_use]
    pub fn error(&self, position: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.input(), Some(position), message)
    }

    /// Returns true if any token other than end of input remains.
    pub fn has_next(&mut self) -> bool {
        if let Some(peeked) = &self.peeked {
            return !peeked.is(TokenKind::Eof);
        }
        self.skip_whitespace();
        self.reader.can_read()
    }

    /// Returns the next token without consuming it.
    ///
    /// # Errors
    /// Fails on malformed input.
    pub fn peek(&mut self) -> ParseResult<&Token> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Consumes and returns the next token.
    ///
    /// # Errors
    /// Fails on malformed input.
    pub fn next(&mut self) -> ParseResult<Token> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    /// Consumes the next token and checks it is one of `kinds`.
    ///
    /// # Errors
    /// Fails with `Expected <kinds>, found <kind>` at the token.
    pub fn expect(&mut self, kinds: &[TokenKind]) -> ParseResult<Token> {
        let token = self.next()?;
        if token.is_any(kinds) {
            Ok(token)
        } else {
            Err(self.error(
                token.position(),
                format!("Expected {}, found {}", describe_kinds(kinds), token.kind),
            ))
        }
    }

    fn scan(&mut self) -> ParseResult<Token> {
        let token = self.scan_token()?;
        self.last_start = token.position();
        Ok(token)
    }

    fn span(&self, start: usize) -> Span {
        self.lines
            .span(self.reader.string(), start, self.reader.cursor())
    }

    fn scan_token(&mut self) -> ParseResult<Token> {
        self.skip_whitespace();
        let start = self.reader.cursor();
        let Some(c) = self.reader.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", self.span(start)));
        };

        if c == '@' {
            self.reader.skip();
            let name = self.reader.read_unquoted_string().to_string();
            if name.is_empty() {
                return Err(self.error(
                    start,
                    "Variable prefix '@' must be followed by an identifier",
                ));
            }
            return Ok(Token::new(TokenKind::Variable, name, self.span(start)));
        }

        if let Some(kind) = TokenKind::from_char(c) {
            self.reader.skip();
            return Ok(Token::new(kind, "", self.span(start)));
        }

        if StringReader::is_quoted_string_start(c) {
            let value = self.reader.read_quoted_string().map_err(|e| {
                let message = self.renderer.render_plain(e.message());
                self.error(e.cursor().unwrap_or(start), message)
            })?;
            return Ok(Token::new(TokenKind::QuotedString, value, self.span(start)));
        }

        if let Some(len) = number_len(self.reader.remaining()) {
            self.reader.set_cursor(start + len);
            let text = &self.reader.string()[start..start + len];
            return Ok(Token::new(TokenKind::Number, text, self.span(start)));
        }

        while self.reader.peek().is_some_and(is_word_char) {
            self.reader.skip();
        }
        let word = &self.reader.string()[start..self.reader.cursor()];
        if word.is_empty() {
            return Err(self.error(start, format!("Unknown token '{c}'")));
        }
        let token = match TokenKind::from_keyword(word) {
            Some(keyword) => Token::new(keyword, "", self.span(start)),
            None => Token::new(TokenKind::Identifier, word, self.span(start)),
        };
        Ok(token)
    }

    fn skip_whitespace(&mut self) {
        loop {
            self.reader.skip_whitespace();
            if self.reader.starts_with("//") {
                while self.reader.peek().is_some_and(|c| c != '\n') {
                    self.reader.skip();
                }
            } else if self.reader.starts_with("/*") {
                self.reader.skip();
                self.reader.skip();
                while self.reader.can_read() && !self.reader.starts_with("*/") {
                    self.reader.skip();
                }
                if self.reader.can_read() {
                    self.reader.skip();
                    self.reader.skip();
                }
            } else {
                break;
            }
        }
    }
}

/// Characters allowed in identifiers and keywords.
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Length of the number literal at the start of `s`: an optional sign,
/// digits, then an optional fraction with an optional exponent. At least one
/// digit is required.
fn number_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let sign = i;
    i = digits_from(i);
    let mut has_digits = i > sign;

    if bytes.get(i) == Some(&b'.') {
        let fraction = digits_from(i + 1);
        if fraction > i + 1 {
            has_digits = true;
            i = fraction;
            if matches!(bytes.get(i), Some(b'e' | b'E')) {
                let mut j = i + 1;
                if matches!(bytes.get(j), Some(b'+' | b'-')) {
                    j += 1;
                }
                let exponent = digits_from(j);
                if exponent > j {
                    i = exponent;
                }
            }
        }
    }

    has_digits.then_some(i)
}
