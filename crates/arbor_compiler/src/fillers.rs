//! Filling method parameters from a command invocation.
//!
//! Every parameter of a handler method is bound once, when the command
//! compiles, to one of: the command source, the command context, the
//! suggestions builder (suggestion methods only) or a parsed argument.
//! At call time [`Fillers::fill`] produces the positional values.

use arbor_dispatch::{CommandContext, SuggestionsBuilder};
use arbor_foundation::{Error, Result, Value};

use crate::diagnostics::Diagnostics;
use crate::reflect::{Method, ParamKind, SourceRef};
use crate::result::{Failure, Resolved};

/// Where one parameter's value comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filler {
    /// The command source.
    Source,
    /// The command context.
    Context,
    /// The suggestions builder.
    Suggestions,
    /// A parsed argument.
    Argument {
        /// Argument name.
        name: String,
        /// If true, a missing argument is passed as nil.
        optional: bool,
    },
}

/// Compiled parameter bindings of one method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fillers {
    fillers: Vec<Filler>,
}

/// What the compiler knows at the call site.
pub struct Site<'a> {
    /// Returns true for argument names visible at this node.
    pub in_scope: &'a dyn Fn(&str) -> bool,
    /// Whether a suggestions-builder parameter is allowed.
    pub suggestions_allowed: bool,
    /// Position warnings and errors are reported at.
    pub position: Option<usize>,
}

impl Fillers {
    /// Binds every parameter of `method`.
    ///
    /// Each bad parameter is reported separately; the returned failure only
    /// summarises them.
    ///
    /// # Errors
    /// Fails if any parameter could not be bound.
    pub fn compile(method: &Method, site: &Site<'_>, diagnostics: &mut Diagnostics) -> Resolved<Self> {
        let params = method.params();
        if params.is_empty() {
            let extra = if site.suggestions_allowed {
                " or SuggestionsBuilder"
            } else {
                ""
            };
            diagnostics.warning(
                site.position,
                format!("No CommandSource or CommandContext{extra} parameters set"),
            );
            return Ok(Self::default());
        }

        let mut fillers = Vec::with_capacity(params.len());
        let mut failed = false;

        for (i, param) in params.iter().enumerate() {
            let kind = param.kind();
            let filler = match kind {
                ParamKind::Context | ParamKind::Source => {
                    let filler = if kind == ParamKind::Context {
                        Filler::Context
                    } else {
                        Filler::Source
                    };
                    if fillers.contains(&filler) {
                        let what = if kind == ParamKind::Context {
                            "CommandContext"
                        } else {
                            "CommandSource"
                        };
                        diagnostics.error(site.position, format!("{what} parameter set twice"));
                        failed = true;
                        continue;
                    }
                    filler
                }
                ParamKind::SuggestionsBuilder if site.suggestions_allowed => {
                    if fillers.contains(&Filler::Suggestions) {
                        diagnostics.error(site.position, "SuggestionsBuilder parameter set twice");
                        failed = true;
                        continue;
                    }
                    Filler::Suggestions
                }
                _ => {
                    let (name, optional) = match (param.binding(), param.name()) {
                        (Some(binding), _) => (binding.name.clone(), binding.optional),
                        (None, Some(name)) => (name.to_string(), false),
                        (None, None) => {
                            let name = format!("arg{i}");
                            diagnostics.warning(
                                site.position,
                                format!(
                                    "Parameter {name} in method '{}' is missing the original parameter name, \
                                     this likely means the parameter name doesn't line up with the argument name",
                                    method.name()
                                ),
                            );
                            (name, false)
                        }
                    };
                    let param_name = param.name().unwrap_or(&name).to_string();
                    if optional && !param.ty().is_nullable() {
                        diagnostics.error(site.position, format!(
                            "Argument '{name}' (param: '{param_name}') is marked as optional despite not \
                             accepting nil, will cause issues if this argument is missing"
                        ));
                        failed = true;
                        continue;
                    }
                    if !optional && !(site.in_scope)(&name) {
                        diagnostics.error(site.position, format!(
                            "Argument '{name}' is not available in the current context"
                        ));
                        failed = true;
                        continue;
                    }
                    Filler::Argument { name, optional }
                }
            };
            fillers.push(filler);
        }

        if failed {
            return Err(Failure::new("Failed to compile method's parameters").or_at(site.position));
        }

        if !fillers.iter().any(|f| matches!(f, Filler::Source | Filler::Context)) {
            diagnostics.warning(
                site.position,
                "No CommandSource or CommandContext parameters set",
            );
        }
        if site.suggestions_allowed && !fillers.contains(&Filler::Suggestions) {
            diagnostics.warning(site.position, "No SuggestionsBuilder parameter set");
        }
        Ok(Self { fillers })
    }

    /// The bindings, in parameter order.
    #[must_use]
    pub fn fillers(&self) -> &[Filler] {
        &self.fillers
    }

    /// Produces positional values for one call.
    ///
    /// # Errors
    /// Fails if a required argument is missing from `context`, or a builder
    /// parameter is filled outside a suggestion call.
    pub fn fill(
        &self,
        context: &CommandContext,
        builder: Option<&SuggestionsBuilder>,
    ) -> Result<Vec<Value>> {
        self.fillers
            .iter()
            .map(|filler| {
                Ok(match filler {
                    Filler::Source => Value::native(SourceRef(context.shared_source().clone())),
                    Filler::Context => Value::native(context.clone()),
                    Filler::Suggestions => Value::native(builder.cloned().ok_or_else(|| {
                        Error::execution("No suggestions builder available for this call")
                    })?),
                    Filler::Argument { name, optional: true } => {
                        context.argument(name).cloned().unwrap_or(Value::Nil)
                    }
                    Filler::Argument { name, optional: false } => {
                        context.get_argument(name)?.clone()
                    }
                })
            })
            .collect()
    }
}
