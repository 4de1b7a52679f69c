//! Semantic compiler for Arbor command trees.
//!
//! A handler is an [`Object`] whose [`Class`] carries the command text and
//! describes the fields and methods the text may reference. [`Registrar`]
//! reads that text, expands preprocessor directives, parses it, resolves
//! every reference against the handler and registers the resulting
//! [`CommandNode`](arbor_dispatch::CommandNode) on a dispatcher.
//!
//! This crate provides:
//! - [`Registrar`] - The registration pipeline and its settings
//! - [`ClassBuilder`] / [`Object`] - Handler descriptions
//! - [`Variables`] - `@name` bindings
//! - [`TypeRegistry`] - Argument type identifiers
//! - [`Loader`] - Sources for `file =` inputs and `#paste` directives
//! - [`Diagnostics`] - Errors and warnings collected while compiling
//! - [`SyntaxSink`] - Receivers of usage lines

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod chain;
pub mod compiled;
pub mod compiler;
pub mod context;
pub mod diagnostics;
pub mod fillers;
pub mod loader;
pub mod options;
pub mod preprocess;
pub mod reflect;
pub mod registrar;
pub mod result;
pub mod syntax;
pub mod types;
pub mod variables;

pub use context::CompileContext;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use loader::{DirectoryLoader, Loader, Loaders, MemoryLoader};
pub use options::RegistrarOptions;
pub use preprocess::preprocess;
pub use reflect::{Args, Class, ClassBuilder, CommandInput, Method, Object, Param};
pub use registrar::{Registrar, Registration};
pub use result::{Failure, Resolved};
pub use syntax::{SyntaxCollector, SyntaxEntry, SyntaxSink};
pub use types::{TypeInfo, TypeParser, TypeRegistry};
pub use variables::Variables;
