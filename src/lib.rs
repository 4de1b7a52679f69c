//! Arbor - command trees compiled from a small declarative language
//!
//! This crate re-exports every layer of Arbor for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: arbor_compiler   - Registrar, type registry, loaders, handler binding
//! Layer 2: arbor_language   - Lexer, parser and error formatting for command files
//! Layer 1: arbor_dispatch   - Command nodes, dispatcher, argument types, suggestions
//! Layer 0: arbor_foundation - Core types (Value, Type, Text, Error, StringReader)
//! ```

pub use arbor_compiler as compiler;
pub use arbor_dispatch as dispatch;
pub use arbor_foundation as foundation;
pub use arbor_language as language;
