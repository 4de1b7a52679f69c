//! Core values, type descriptors, text, and the character reader for Arbor.
//!
//! This crate provides:
//! - [`Value`] - Dynamic values passed between handlers and compiled commands
//! - [`Type`] - Type descriptors for reflected members and variables
//! - [`Text`] / [`TextRenderer`] - Translatable messages and the rendering hook
//! - [`StringReader`] - Cursor-based reader shared by the lexer and argument types
//! - [`Error`] / [`SyntaxError`] - Rich error types with context
//! - Persistent collections ([`SharedVec`], [`SharedMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod reader;
pub mod text;
pub mod types;
pub mod value;

pub use collections::{SharedMap, SharedVec};
pub use error::{Error, ErrorContext, ErrorKind, SyntaxError};
pub use reader::{ReadResult, StringReader};
pub use text::{PlainRenderer, Text, TextRenderer, TranslationTable};
pub use types::Type;
pub use value::{Native, NativeType, Value};

/// Result type alias using Arbor's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
