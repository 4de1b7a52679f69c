//! Shared callable handles attached to command nodes.
//!
//! Each handle wraps an `Arc`'d closure so it can be cloned onto alias
//! nodes and carried inside [`Value::Native`](arbor_foundation::Value).

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{NativeType, Result, Value};

use crate::context::CommandContext;
use crate::node::NodeBuilder;
use crate::source::CommandSource;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

type CommandFn = dyn Fn(&CommandContext) -> Result<i32> + Send + Sync;
type RequirementFn = dyn Fn(&dyn CommandSource) -> bool + Send + Sync;
type SuggestFn = dyn Fn(&CommandContext, SuggestionsBuilder) -> Result<Suggestions> + Send + Sync;
type ModifierFn = dyn Fn(&CommandContext, Value) -> Result<Value> + Send + Sync;
type TransformFn = dyn Fn(&mut NodeBuilder) -> Result<()> + Send + Sync;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $fn_ty:ty, $type_name:literal) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(Arc<$fn_ty>);

        impl NativeType for $name {
            const TYPE_NAME: &'static str = $type_name;
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($type_name, "@{:p}"), Arc::as_ptr(&self.0))
            }
        }
    };
}

handle!(
    /// A command action. Returns a result code, conventionally `1`.
    Command,
    CommandFn,
    "Command"
);

handle!(
    /// Decides whether a source may use a node.
    Requirement,
    RequirementFn,
    "Predicate"
);

handle!(
    /// Produces suggestions for an argument node.
    SuggestionProvider,
    SuggestFn,
    "SuggestionProvider"
);

handle!(
    /// Rewrites a parsed argument value before an action sees it.
    ArgumentModifier,
    ModifierFn,
    "ArgumentModifier"
);

handle!(
    /// Edits a node builder after its children have been attached.
    Transformer,
    TransformFn,
    "Transformer"
);

impl Command {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&CommandContext) -> Result<i32> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Runs the action.
    ///
    /// # Errors
    /// Propagates the action's failure.
    pub fn run(&self, context: &CommandContext) -> Result<i32> {
        (self.0)(context)
    }
}

impl Requirement {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&dyn CommandSource) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A requirement every source passes.
    #[must_use]
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Tests a source.
    #[must_use]
    pub fn test(&self, source: &dyn CommandSource) -> bool {
        (self.0)(source)
    }

    /// A requirement passing only when every one of `all` passes.
    ///
    /// Returns `None` for an empty list and the single element unchanged for
    /// a list of one.
    #[must_use]
    pub fn all(mut all: Vec<Requirement>) -> Option<Self> {
        match all.len() {
            0 => None,
            1 => all.pop(),
            _ => Some(Self::new(move |source| all.iter().all(|r| r.test(source)))),
        }
    }
}

impl SuggestionProvider {
    /// Wraps a closure.
    pub fn new(
        f: impl Fn(&CommandContext, SuggestionsBuilder) -> Result<Suggestions> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    /// Suggests a fixed list of strings that match the typed prefix.
    #[must_use]
    pub fn strings(values: Vec<String>) -> Self {
        Self::new(move |_, mut builder| {
            for value in &values {
                builder.suggest_matching(value.clone());
            }
            Ok(builder.build())
        })
    }

    /// Produces suggestions.
    ///
    /// # Errors
    /// Propagates the provider's failure.
    pub fn suggest(
        &self,
        context: &CommandContext,
        builder: SuggestionsBuilder,
    ) -> Result<Suggestions> {
        (self.0)(context, builder)
    }
}

impl ArgumentModifier {
    /// Wraps a closure.
    pub fn new(
        f: impl Fn(&CommandContext, Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    /// Rewrites `input`.
    ///
    /// # Errors
    /// Propagates the modifier's failure.
    pub fn apply(&self, context: &CommandContext, input: Value) -> Result<Value> {
        (self.0)(context, input)
    }
}

impl Transformer {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&mut NodeBuilder) -> Result<()> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Applies the edit.
    ///
    /// # Errors
    /// Propagates the transformer's failure.
    pub fn apply(&self, builder: &mut NodeBuilder) -> Result<()> {
        (self.0)(builder)
    }
}
