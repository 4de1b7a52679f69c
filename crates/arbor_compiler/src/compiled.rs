//! Runtime handles produced by the compiler.
//!
//! Everything here runs after registration: commands, requirements,
//! suggestion providers and argument mappers that reach back into the
//! handler object through a member chain.

use std::sync::Arc;

use arbor_dispatch::{
    ArgumentModifier, Command, CommandContext, Requirement, SuggestionProvider, Suggestions,
    Transformer,
};
use arbor_foundation::{Error, NativeType, Result, Value};
use arbor_language::{MemberChain, MemberKind};
use tracing::{trace, warn};

use crate::chain::{self, Member};
use crate::fillers::Fillers;
use crate::reflect::{Args, Class, Method, Object, ParamKind, SourceRef};

// =============================================================================
// Context factory
// =============================================================================

/// Applies the argument mappers in scope at an `executes` site.
///
/// Mappers for the same argument run in declaration order, each receiving
/// the previous one's output.
#[derive(Clone, Debug, Default)]
pub struct ContextFactory {
    mappers: Vec<(String, Vec<ArgumentModifier>)>,
}

impl ContextFactory {
    /// Groups `(argument, mapper)` pairs by argument, keeping first-seen
    /// order.
    #[must_use]
    pub fn new(pairs: &[(String, ArgumentModifier)]) -> Self {
        let mut mappers: Vec<(String, Vec<ArgumentModifier>)> = Vec::new();
        for (argument, mapper) in pairs {
            match mappers.iter_mut().find(|(name, _)| name == argument) {
                Some((_, list)) => list.push(mapper.clone()),
                None => mappers.push((argument.clone(), vec![mapper.clone()])),
            }
        }
        Self { mappers }
    }

    /// Returns true if no mappers apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// The context an action sees: `base` with every mapped argument
    /// rebound. Arguments absent from `base` are skipped.
    ///
    /// # Errors
    /// Propagates the first mapper failure.
    pub fn create(&self, base: &CommandContext) -> Result<CommandContext> {
        let mut context = base.clone();
        for (argument, mappers) in &self.mappers {
            let Some(original) = base.argument(argument) else {
                continue;
            };
            let mut value = original.clone();
            for mapper in mappers {
                value = mapper.apply(base, value)?;
            }
            context = context.with_argument(argument, value);
        }
        Ok(context)
    }
}

// =============================================================================
// Member targets
// =============================================================================

/// A compiled member chain on the handler.
#[derive(Clone, Debug)]
pub struct Target {
    handler: Object,
    chain: Arc<MemberChain>,
    member: Member,
}

impl Target {
    /// Pairs a chain with the terminal member it compiled to.
    #[must_use]
    pub fn new(handler: Object, chain: MemberChain, member: Member) -> Self {
        Self {
            handler,
            chain: Arc::new(chain),
            member,
        }
    }

    /// The terminal member.
    #[must_use]
    pub fn member(&self) -> &Member {
        &self.member
    }

    fn receiver(&self) -> Result<Object> {
        chain::resolve_last(&self.handler, &self.chain).map(|(object, _)| object)
    }

    /// Reads the terminal field, or calls the terminal method with `args`.
    ///
    /// # Errors
    /// Fails if any link fails.
    pub fn invoke(&self, args: &mut Args<'_>) -> Result<Value> {
        let receiver = self.receiver()?;
        trace!(chain = %self.chain, "invoking member");
        match &self.member {
            Member::Field(field) => field.get(&receiver),
            Member::Method(method) => method.invoke(&receiver, args),
        }
    }

    /// Reads the terminal field as a host value of type `T`.
    ///
    /// # Errors
    /// Fails if the chain fails or the value is not a `T`.
    pub fn read<T: NativeType + Clone>(&self) -> Result<T> {
        let value = self.invoke(&mut Args::empty())?;
        value.as_native::<T>().cloned().ok_or_else(|| {
            Error::execution(format!(
                "'{}' does not point to a {}",
                self.chain,
                T::TYPE_NAME
            ))
        })
    }
}

// =============================================================================
// Executes
// =============================================================================

/// Wraps a variable-bound command so it sees mapped arguments.
#[must_use]
pub fn mapped_command(command: Command, factory: ContextFactory) -> Command {
    if factory.is_empty() {
        return command;
    }
    Command::new(move |context| command.run(&factory.create(context)?))
}

/// A field holding a command. The command runs with the unmapped context.
#[must_use]
pub fn field_command(target: Target) -> Command {
    Command::new(move |context| target.read::<Command>()?.run(context))
}

/// A handler method run as the command action.
///
/// An integer result is the command's result code; anything else yields 0.
#[must_use]
pub fn method_command(target: Target, fillers: Fillers, factory: ContextFactory) -> Command {
    Command::new(move |context| {
        let context = factory.create(context)?;
        let mut args = Args::new(fillers.fill(&context, None)?);
        match target.invoke(&mut args)? {
            Value::Int(code) => i32::try_from(code).map_err(|_| {
                Error::execution(format!("Result code {code} does not fit in 32 bits"))
            }),
            _ => Ok(0),
        }
    })
}

// =============================================================================
// Requires
// =============================================================================

/// A field holding a requirement, read on every test.
#[must_use]
pub fn field_requirement(target: Target) -> Requirement {
    Requirement::new(move |source| match target.read::<Requirement>() {
        Ok(requirement) => requirement.test(source),
        Err(error) => {
            warn!(%error, "requirement field could not be read");
            false
        }
    })
}

/// A method taking the source and returning a boolean.
#[must_use]
pub fn method_requirement(target: Target) -> Requirement {
    Requirement::new(move |source| {
        match target.invoke(&mut Args::with_source(source)) {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(error) => {
                warn!(%error, "requirement method failed");
                false
            }
        }
    })
}

// =============================================================================
// Suggests
// =============================================================================

/// A field holding a suggestion provider.
#[must_use]
pub fn field_suggestions(target: Target) -> SuggestionProvider {
    SuggestionProvider::new(move |context, builder| {
        target.read::<SuggestionProvider>()?.suggest(context, builder)
    })
}

/// A method producing suggestions.
#[must_use]
pub fn method_suggestions(target: Target, fillers: Fillers, factory: ContextFactory) -> SuggestionProvider {
    SuggestionProvider::new(move |context, builder| {
        let context = factory.create(context)?;
        let mut args = Args::new(fillers.fill(&context, Some(&builder))?);
        let value = target.invoke(&mut args)?;
        value.as_native::<Suggestions>().cloned().ok_or_else(|| {
            Error::type_mismatch(Suggestions::native_type(), value.value_type())
        })
    })
}

// =============================================================================
// Transforms
// =============================================================================

/// A field holding a transformer.
#[must_use]
pub fn field_transformer(target: Target) -> Transformer {
    Transformer::new(move |builder| target.read::<Transformer>()?.apply(builder))
}

/// A method receiving the node builder.
#[must_use]
pub fn method_transformer(target: Target) -> Transformer {
    Transformer::new(move |builder| {
        target.invoke(&mut Args::with_builder(builder))?;
        Ok(())
    })
}

// =============================================================================
// Mappers
// =============================================================================

/// A mapper on the handler: `map_result = normalize()`.
///
/// A field terminal holding an [`ArgumentModifier`] is applied; any other
/// field value replaces the argument. A method terminal is picked per call
/// from the overloads that accept the input.
#[must_use]
pub fn handler_mapper(handler: Object, chain: MemberChain) -> ArgumentModifier {
    ArgumentModifier::new(move |context, input| {
        let (object, link) = chain::resolve_last(&handler, &chain)?;
        map_on(&object, link, context, input, true)
    })
}

/// A mapper on the argument value itself: `map_result = result.trim()`.
#[must_use]
pub fn result_mapper(chain: MemberChain) -> ArgumentModifier {
    ArgumentModifier::new(move |context, input| {
        let object = Object::from_value(&input).ok_or_else(|| {
            Error::execution(format!(
                "Cannot map '{chain}' on a value of type {}, it has no members",
                input.value_type()
            ))
        })?;
        let (object, link) = chain::resolve_last(&object, &chain)?;
        map_on(&object, link, context, input, false)
    })
}

fn map_on(
    object: &Object,
    link: &MemberChain,
    context: &CommandContext,
    input: Value,
    on_handler: bool,
) -> Result<Value> {
    if link.kind == MemberKind::Field {
        let value = object.get(&link.name)?;
        return match value.as_native::<ArgumentModifier>() {
            Some(modifier) if on_handler => modifier.apply(context, input),
            _ => Ok(value),
        };
    }
    let method = select_mapper(object.class(), &link.name, &input, on_handler)?;
    let values = method
        .params()
        .iter()
        .map(|param| match param.kind() {
            ParamKind::Source => Value::native(SourceRef(context.shared_source().clone())),
            ParamKind::Context => Value::native(context.clone()),
            _ => input.clone(),
        })
        .collect();
    method.invoke(object, &mut Args::new(values))
}

fn select_mapper(class: &Class, name: &str, input: &Value, on_handler: bool) -> Result<Arc<Method>> {
    let input_type = input.value_type();
    class
        .methods_named(name)
        .find(|method| {
            !method.is_void()
                && (!on_handler || !method.params().is_empty())
                && method.params().iter().all(|param| {
                    matches!(param.kind(), ParamKind::Source | ParamKind::Context)
                        || param.ty().accepts(&input_type)
                })
        })
        .cloned()
        .ok_or_else(|| {
            Error::execution(format!(
                "Found no methods matching '{name}'. Valid methods must have at least 1 parameter, \
                 not return void and have all parameters be either the input value, a CommandSource \
                 or a CommandContext"
            ))
        })
}
