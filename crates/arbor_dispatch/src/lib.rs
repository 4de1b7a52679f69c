//! Command sources, argument types, command nodes, and the dispatcher for
//! Arbor.
//!
//! This crate provides:
//! - [`CommandSource`] - Who runs a command (permissions, messages)
//! - [`CommandContext`] - Parsed arguments of one invocation
//! - [`ArgumentType`] - Built-in argument parsers plus map, array and enum types
//! - [`CommandNode`] / [`NodeBuilder`] - The executable tree
//! - [`Dispatcher`] - Registration, execution and suggestions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod argument;
pub mod context;
pub mod dispatcher;
pub mod function;
pub mod node;
pub mod source;
pub mod suggestion;

pub use argument::{
    ArgumentType, ArgumentTypeRef, ArrayArgument, BoolArgument, DoubleArgument, EnumArgument,
    FloatArgument, IntegerArgument, LongArgument, MapArgument, StringArgument, StringKind,
};
pub use context::{CommandContext, ParsedArgument};
pub use dispatcher::{Dispatcher, ParseResults};
pub use function::{ArgumentModifier, Command, Requirement, SuggestionProvider, Transformer};
pub use node::{CommandNode, NodeBuilder, NodeKind};
pub use source::{BasicSource, CommandSource, Permission, SharedSource};
pub use suggestion::{Suggestion, Suggestions, SuggestionsBuilder};
