//! Token types for the command-tree grammar.
//!
//! Tokens are the output of the lexer and input to the parser.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Payload: variable name, unescaped string, number or identifier text.
    /// Empty for keywords and punctuation.
    pub value: String,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
        }
    }

    /// Byte offset where the token starts.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.span.start
    }

    /// Returns true if the token has the given kind.
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Returns true if the token has any of the given kinds.
    #[must_use]
    pub fn is_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            f.write_str(&self.value)
        }
    }
}

/// Token types for the command-tree grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    // Keywords
    /// `name`
    Name,
    /// `permission`
    Permission,
    /// `description`
    Description,
    /// `aliases`
    Aliases,
    /// `executes`
    Executes,
    /// `suggests`
    Suggests,
    /// `requires`
    Requires,
    /// `literal`
    Literal,
    /// `argument`
    Argument,
    /// `map_result`
    MapResult,
    /// `label`
    Label,
    /// `translatable`
    Translatable,
    /// `translate_plain`
    TranslatePlain,
    /// `transform`
    Transform,
    /// `true`
    True,
    /// `false`
    False,

    // Punctuation
    /// `=`
    Assign,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `|`
    Wall,
    /// `#`
    Hashtag,
    /// `{`
    ScopeBegin,
    /// `}`
    ScopeEnd,
    /// `(`
    BracketOpen,
    /// `)`
    BracketClose,
    /// `[`
    SquareOpen,
    /// `]`
    SquareClose,

    // Values
    /// `'text'` or `"text"`
    QuotedString,
    /// Bare word that is not a keyword
    Identifier,
    /// `@name`
    Variable,
    /// Numeric literal like `5`, `-2.5` or `.5e3`
    Number,
    /// End of input
    Eof,
}

impl TokenKind {
    /// The punctuation kind bound to `c`.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '=' => Self::Assign,
            ',' => Self::Comma,
            '.' => Self::Dot,
            '|' => Self::Wall,
            '#' => Self::Hashtag,
            '{' => Self::ScopeBegin,
            '}' => Self::ScopeEnd,
            '(' => Self::BracketOpen,
            ')' => Self::BracketClose,
            '[' => Self::SquareOpen,
            ']' => Self::SquareClose,
            _ => return None,
        })
    }

    /// The keyword kind spelled `word`.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "name" => Self::Name,
            "permission" => Self::Permission,
            "description" => Self::Description,
            "aliases" => Self::Aliases,
            "executes" => Self::Executes,
            "suggests" => Self::Suggests,
            "requires" => Self::Requires,
            "literal" => Self::Literal,
            "argument" => Self::Argument,
            "map_result" => Self::MapResult,
            "label" => Self::Label,
            "translatable" => Self::Translatable,
            "translate_plain" => Self::TranslatePlain,
            "transform" => Self::Transform,
            "true" => Self::True,
            "false" => Self::False,
            _ => return None,
        })
    }

    /// The character this kind is bound to, for punctuation.
    #[must_use]
    pub const fn character(self) -> Option<char> {
        Some(match self {
            Self::Assign => '=',
            Self::Comma => ',',
            Self::Dot => '.',
            Self::Wall => '|',
            Self::Hashtag => '#',
            Self::ScopeBegin => '{',
            Self::ScopeEnd => '}',
            Self::BracketOpen => '(',
            Self::BracketClose => ')',
            Self::SquareOpen => '[',
            Self::SquareClose => ']',
            _ => return None,
        })
    }

    /// Returns true for keyword kinds.
    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::Name
                | Self::Permission
                | Self::Description
                | Self::Aliases
                | Self::Executes
                | Self::Suggests
                | Self::Requires
                | Self::Literal
                | Self::Argument
                | Self::MapResult
                | Self::Label
                | Self::Translatable
                | Self::TranslatePlain
                | Self::Transform
                | Self::True
                | Self::False
        )
    }

    /// Lowercase name used in diagnostics. For keywords this is also the
    /// spelling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Permission => "permission",
            Self::Description => "description",
            Self::Aliases => "aliases",
            Self::Executes => "executes",
            Self::Suggests => "suggests",
            Self::Requires => "requires",
            Self::Literal => "literal",
            Self::Argument => "argument",
            Self::MapResult => "map_result",
            Self::Label => "label",
            Self::Translatable => "translatable",
            Self::TranslatePlain => "translate_plain",
            Self::Transform => "transform",
            Self::True => "true",
            Self::False => "false",
            Self::Assign => "assign",
            Self::Comma => "comma",
            Self::Dot => "dot",
            Self::Wall => "wall",
            Self::Hashtag => "hashtag",
            Self::ScopeBegin => "scope_begin",
            Self::ScopeEnd => "scope_end",
            Self::BracketOpen => "bracket_open",
            Self::BracketClose => "bracket_close",
            Self::SquareOpen => "square_open",
            Self::SquareClose => "square_close",
            Self::QuotedString => "quoted_string",
            Self::Identifier => "identifier",
            Self::Variable => "variable",
            Self::Number => "number",
            Self::Eof => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders an expectation: `comma`, or `one of: comma, bracket_close`.
#[must_use]
pub fn describe_kinds(kinds: &[TokenKind]) -> String {
    match kinds {
        [single] => single.to_string(),
        _ => {
            let names: Vec<&str> = kinds.iter().map(|k| k.name()).collect();
            format!("one of: {}", names.join(", "))
        }
    }
}
