//! Lexer, parser, and AST for the Arbor command-tree grammar.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization with one token of lookahead
//! - [`Parser`] - Recursive descent into a [`Root`]
//! - [`pretty`] - Printing a tree back to source
//! - [`format_error`] - Caret-annotated error messages

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod report;
pub mod span;
pub mod token;

use arbor_foundation::{PlainRenderer, TextRenderer};

pub use ast::{
    Body, Description, Executes, MapperKind, MemberChain, MemberKind, Name, Node, NodeKind,
    OptionValue, Requires, ResultMapper, Root, Suggests, Transform, TypeRef,
};
pub use lexer::Lexer;
pub use parser::{DefaultExecutesRule, FieldKey, ParseOptions, Parser};
pub use report::{ParseError, ParseResult, format_error};
pub use span::{LineIndex, Span};
pub use token::{Token, TokenKind};

/// Parses one command, rendering reader failures with [`PlainRenderer`].
///
/// # Errors
/// Fails on the first lexical or grammatical error.
pub fn parse(input: &str, options: &ParseOptions) -> ParseResult<Root> {
    parse_with(input, options, &PlainRenderer)
}

/// Parses one command, rendering reader failures with `renderer`.
///
/// # Errors
/// Fails on the first lexical or grammatical error.
pub fn parse_with(
    input: &str,
    options: &ParseOptions,
    renderer: &dyn TextRenderer,
) -> ParseResult<Root> {
    Parser::new(Lexer::new(input, renderer), options.clone()).parse()
}
