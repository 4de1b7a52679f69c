//! The per-invocation command context.

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{Error, NativeType, Result, SharedMap, Type, Value};

use crate::source::{CommandSource, SharedSource};

/// An argument value together with the input range it was parsed from.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedArgument {
    /// Byte range in the input.
    pub range: (usize, usize),
    /// The parsed value.
    pub value: Value,
}

/// Everything a command action can see about one invocation.
///
/// Cheap to clone: arguments live in a persistent map, so mapped copies
/// share structure with the original.
#[derive(Clone)]
pub struct CommandContext {
    source: SharedSource,
    input: Arc<str>,
    arguments: SharedMap<Arc<str>, ParsedArgument>,
}

impl CommandContext {
    /// Creates a context with no arguments.
    #[must_use]
    pub fn new(source: SharedSource, input: impl Into<Arc<str>>) -> Self {
        Self {
            source,
            input: input.into(),
            arguments: SharedMap::new(),
        }
    }

    /// The source running the command.
    #[must_use]
    pub fn source(&self) -> &dyn CommandSource {
        &*self.source
    }

    /// The shared source handle.
    #[must_use]
    pub fn shared_source(&self) -> &SharedSource {
        &self.source
    }

    /// The full input line.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Looks up a parsed argument value.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name).map(|a| &a.value)
    }

    /// Looks up a parsed argument, failing if it does not exist.
    ///
    /// # Errors
    /// Returns an execution error naming the missing argument.
    pub fn get_argument(&self, name: &str) -> Result<&Value> {
        self.argument(name).ok_or_else(|| {
            Error::execution(format!(
                "No such argument '{name}' exists on this command"
            ))
        })
    }

    /// Looks up an argument and checks its type.
    ///
    /// # Errors
    /// Fails if the argument is missing or not accepted by `expected`.
    pub fn get_typed(&self, name: &str, expected: &Type) -> Result<&Value> {
        let value = self.get_argument(name)?;
        let actual = value.value_type();
        if expected.accepts(&actual) {
            Ok(value)
        } else {
            Err(Error::type_mismatch(expected.clone(), actual))
        }
    }

    /// Returns true if the argument was parsed.
    #[must_use]
    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// Records a parsed argument.
    pub fn put_argument(&mut self, name: impl Into<Arc<str>>, argument: ParsedArgument) {
        self.arguments.set(name.into(), argument);
    }

    /// A copy with `name` rebound to `value`, keeping the original range.
    #[must_use]
    pub fn with_argument(&self, name: &str, value: Value) -> Self {
        let range = self.arguments.get(name).map_or((0, 0), |a| a.range);
        let mut copy = self.clone();
        copy.arguments.set(name.into(), ParsedArgument { range, value });
        copy
    }

    /// Argument names and values, in no particular order.
    pub fn arguments(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.arguments.iter().map(|(k, a)| (&**k, &a.value))
    }
}

impl NativeType for CommandContext {
    const TYPE_NAME: &'static str = "CommandContext";
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("source", &self.source.name())
            .field("input", &self.input)
            .field("arguments", &self.arguments)
            .finish()
    }
}
