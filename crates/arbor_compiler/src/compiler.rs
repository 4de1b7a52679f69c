//! The semantic pass.
//!
//! [`compile`] walks a parsed [`Root`] once and builds the command node
//! tree. Recoverable problems are reported into the [`CompileContext`] and
//! replaced by placeholders (the name [`FAILED`], the `word` argument type,
//! or simply a missing action), so a single pass finds every error.

use arbor_dispatch::{
    ArgumentModifier, ArgumentTypeRef, Command, CommandNode, NodeBuilder, Permission, Requirement,
    StringArgument, SuggestionProvider, Transformer,
};
use arbor_foundation::{NativeType, Text, Type, Value};
use arbor_language::{
    Body, Description, Executes, MapperKind, MemberChain, Name, Node, NodeKind, Requires,
    ResultMapper, Root, Suggests, Transform,
};
use tracing::debug;

use crate::chain::{self, Contract, Member, Returns};
use crate::compiled::{
    Target, field_command, field_requirement, field_suggestions, field_transformer,
    handler_mapper, mapped_command, method_command, method_requirement, method_suggestions,
    method_transformer, result_mapper,
};
use crate::context::CompileContext;
use crate::fillers::{Fillers, Site};
use crate::reflect::{Method, NODE_BUILDER_TYPE, SOURCE_TYPE, SUGGESTIONS_TYPE};
use crate::result::{Failure, Resolved};

/// Placeholder name of a node whose name could not be resolved.
pub const FAILED: &str = "FAILED";

const COMMAND_RETURNS: &[Type] = &[Type::Int, Type::Nil];
const REQUIRES_RETURNS: &[Type] = &[Type::Bool];
const REQUIRES_PARAMS: &[Type] = &[SOURCE_TYPE];
const SUGGESTS_RETURNS: &[Type] = &[SUGGESTIONS_TYPE];
const TRANSFORM_RETURNS: &[Type] = &[Type::Nil];
const TRANSFORM_PARAMS: &[Type] = &[NODE_BUILDER_TYPE];

/// Compiles a parsed command into its node tree.
///
/// Never fails: check the context's diagnostics before using the result.
pub fn compile(root: &Root, context: &mut CompileContext<'_>) -> CommandNode {
    context.scoped(|context| {
        let name = resolve_name(&root.body.name, context);
        let name = context.report_or(name, FAILED.to_string());

        let mut builder = NodeBuilder::literal(name.as_str());
        builder.plain_translation(root.plain_translation);

        let permission = match &root.permission {
            Some(permission) => {
                let resolved = resolve_name(permission, context);
                context
                    .report(resolved)
                    .map(|p| p.replace("{command}", &name))
            }
            None => context.defaulted_permission(&name),
        };
        if let Some(permission) = permission {
            context.push_condition(permission_requirement(Permission::new(permission.as_str())));
            builder.permission(permission);
        }

        let aliases: Vec<_> = root
            .aliases
            .iter()
            .map(|alias| resolve_name(alias, context))
            .collect();
        for alias in context.report_all(aliases) {
            builder.alias(alias);
        }

        visit_body(&root.body, &mut builder, &name, None, context);

        let node = builder.build();
        debug!(
            command = %name,
            nodes = node.node_count(),
            errors = context.diagnostics().error_count(),
            warnings = context.diagnostics().warning_count(),
            "compiled command tree"
        );
        node
    })
}

// =============================================================================
// Nodes
// =============================================================================

fn visit_node(node: &Node, context: &mut CompileContext<'_>) -> CommandNode {
    context.scoped(|context| {
        let resolved = resolve_name(&node.body.name, context);
        let resolved = context.report(resolved);
        let name = resolved.clone().unwrap_or_else(|| FAILED.to_string());

        let (mut builder, label) = match &node.kind {
            NodeKind::Literal => (NodeBuilder::literal(name.as_str()), name.clone()),
            NodeKind::Argument { ty, suggests } => {
                let ty = context.types().resolve(ty, context.variables());
                let ty = context
                    .report(ty)
                    .unwrap_or_else(|| ArgumentTypeRef::new(StringArgument::word()));

                if resolved.is_some() {
                    if context.has_argument(&name) {
                        context.error(
                            Some(node.body.name.position()),
                            format!("Duplicate argument name, {name} already declared"),
                        );
                    }
                    context.push_argument(name.as_str());
                }

                let mut builder = NodeBuilder::argument(name.as_str(), ty);
                if let Some(suggests) = suggests {
                    let provider = compile_suggests(suggests, context);
                    if let Some(provider) = context.report(provider) {
                        builder.suggests(provider);
                    }
                }
                (builder, format!("<{name}>"))
            }
        };

        visit_body(&node.body, &mut builder, &name, Some(label), context);
        builder.build()
    })
}

/// Shared handling of every node kind. `label` is `None` for the root,
/// which never appears in usage paths.
fn visit_body(
    body: &Body,
    builder: &mut NodeBuilder,
    name: &str,
    label: Option<String>,
    context: &mut CompileContext<'_>,
) {
    compile_mappers(&body.mappers, name, context);

    let is_root = label.is_none();
    if let Some(default) = label {
        let label = match &body.label {
            Some(custom) => {
                let resolved = resolve_name(custom, context);
                context.report_or(resolved, FAILED.to_string())
            }
            None => default,
        };
        context.push_label(label);
    }

    if let Some(requires) = &body.requires {
        let requirement = compile_requires(requires, context);
        if let Some(requirement) = context.report(requirement) {
            context.push_condition(requirement.clone());
            builder.requires(requirement);
        }
    }

    if let Some(description) = &body.description {
        let text = compile_description(description, context);
        if let Some(text) = context.report(text) {
            if !is_root || body.executes.is_some() {
                context.add_usage(text.clone());
            }
            builder.description(text);
        }
    }

    if let Some(executes) = &body.executes {
        let command = compile_executes(executes, context);
        if let Some(command) = context.report(command) {
            builder.executes(command);
        }
    }

    for child in &body.children {
        let child = visit_node(child, context);
        builder.then(child);
    }

    for transform in &body.transforms {
        let transformer = compile_transform(transform, context);
        if let Some(transformer) = context.report(transformer) {
            if let Err(error) = transformer.apply(builder) {
                context.error(
                    Some(transform.position()),
                    format!("Failed to apply transform: {error}"),
                );
            }
        }
    }
}

// =============================================================================
// Names
// =============================================================================

fn resolve_name(name: &Name, context: &mut CompileContext<'_>) -> Resolved<String> {
    match name {
        Name::Literal { value, .. } => Ok(value.clone()),
        Name::Variable { name, pos } => {
            let value = context.variables().resolve(name, *pos, &Type::Any)?;
            if let Some(text) = value.as_str() {
                return Ok(text.to_string());
            }
            if let Some(permission) = value.as_native::<Permission>() {
                return Ok(permission.name().to_string());
            }
            Err(Failure::at(
                *pos,
                format!(
                    "Variable '{name}' is defined as {}, must be 'string'",
                    value.value_type()
                ),
            ))
        }
        Name::Field { name, pos } => field_name(name, *pos, context),
    }
}

fn field_name(name: &str, pos: usize, context: &mut CompileContext<'_>) -> Resolved<String> {
    let handler = context.handler();
    let class = handler.class();
    let field = class.field(name).ok_or_else(|| {
        Failure::at(
            pos,
            format!("Reflection error while accessing field '{name}': No such field '{name}' in {class}"),
        )
    })?;

    if field.is_mutable() {
        let severity = context.options().mutable_name_field_severity;
        context.push_diagnostic(
            severity,
            Some(pos),
            format!(
                "Field '{name}' in '{class}' is not final! Changes to this field will not be \
                 reflected in the command tree"
            ),
        );
    }

    if *field.ty() != Type::String && *field.ty() != Type::option(Type::String) {
        return Err(Failure::at(
            pos,
            format!("Cannot get name from field '{name}' in {class}. Field's type is not text"),
        ));
    }

    let value = field.get(handler).map_err(|error| {
        Failure::at(
            pos,
            format!("Reflection error while accessing field '{name}': {error}"),
        )
    })?;
    match value {
        Value::String(text) => Ok(text.to_string()),
        _ => Err(Failure::at(
            pos,
            format!("Field '{name}' in {class} returned null! Cannot get name"),
        )),
    }
}

fn permission_requirement(permission: Permission) -> Requirement {
    Requirement::new(move |source| permission.test(source))
}

// =============================================================================
// Member-backed handles
// =============================================================================

fn target(chain: &MemberChain, contract: &Contract<'_>, pos: Option<usize>, context: &CompileContext<'_>) -> Resolved<Target> {
    let handler = context.handler();
    let member = chain::compile(handler.class(), chain, contract).map_err(|f| f.or_at(pos))?;
    Ok(Target::new(handler.clone(), chain.clone(), member))
}

fn fillers(
    method: &Method,
    suggestions: bool,
    position: Option<usize>,
    context: &mut CompileContext<'_>,
) -> Resolved<Fillers> {
    let scope = context.arguments().to_vec();
    let in_scope = |name: &str| scope.iter().any(|a| a == name);
    let site = Site {
        in_scope: &in_scope,
        suggestions_allowed: suggestions,
        position,
    };
    Fillers::compile(method, &site, context.diagnostics_mut())
}

fn compile_executes(executes: &Executes, context: &mut CompileContext<'_>) -> Resolved<Command> {
    let pos = executes.position();
    let factory = context.context_factory();
    match executes {
        Executes::Variable { name, .. } => {
            let command = context
                .variables()
                .resolve_native::<Command>(name, pos.unwrap_or_default())
                .map_err(|mut failure| {
                    failure.position = pos;
                    failure
                })?;
            Ok(mapped_command(command, factory))
        }
        Executes::Member { chain, .. } => {
            let field_type = Command::native_type();
            let contract = Contract {
                field_type: Some(&field_type),
                returns: Returns::OneOf(COMMAND_RETURNS),
                params: None,
                unique: true,
            };
            let target = target(chain, &contract, pos, context)?;
            match target.member().clone() {
                Member::Field(_) => Ok(field_command(target)),
                Member::Method(method) => {
                    let fillers = fillers(&method, false, pos, context)?;
                    Ok(method_command(target, fillers, factory))
                }
            }
        }
    }
}

fn compile_requires(requires: &Requires, context: &mut CompileContext<'_>) -> Resolved<Requirement> {
    match requires {
        Requires::Variable { name, pos } => context.variables().resolve_native(name, *pos),
        Requires::Constant { value, .. } => {
            let value = *value;
            Ok(Requirement::new(move |_| value))
        }
        Requires::Permission { name, .. } => {
            let permission = resolve_name(name, context)?;
            Ok(permission_requirement(Permission::new(permission.as_str())))
        }
        Requires::Member { chain, pos } => {
            let field_type = Requirement::native_type();
            let contract = Contract {
                field_type: Some(&field_type),
                returns: Returns::OneOf(REQUIRES_RETURNS),
                params: Some(REQUIRES_PARAMS),
                unique: true,
            };
            let target = target(chain, &contract, Some(*pos), context)?;
            Ok(match target.member() {
                Member::Field(_) => field_requirement(target),
                Member::Method(_) => method_requirement(target),
            })
        }
    }
}

fn compile_suggests(
    suggests: &Suggests,
    context: &mut CompileContext<'_>,
) -> Resolved<SuggestionProvider> {
    match suggests {
        Suggests::Variable { name, pos } => context.variables().resolve_native(name, *pos),
        Suggests::Strings { values, .. } => Ok(SuggestionProvider::strings(values.clone())),
        Suggests::Member { chain, pos } => {
            let field_type = SuggestionProvider::native_type();
            let contract = Contract {
                field_type: Some(&field_type),
                returns: Returns::OneOf(SUGGESTS_RETURNS),
                params: None,
                unique: true,
            };
            let target = target(chain, &contract, Some(*pos), context)?;
            match target.member().clone() {
                Member::Field(_) => Ok(field_suggestions(target)),
                Member::Method(method) => {
                    let fillers = fillers(&method, true, Some(*pos), context)?;
                    Ok(method_suggestions(target, fillers, context.context_factory()))
                }
            }
        }
    }
}

fn compile_transform(
    transform: &Transform,
    context: &mut CompileContext<'_>,
) -> Resolved<Transformer> {
    match transform {
        Transform::Variable { name, pos } => context.variables().resolve_native(name, *pos),
        Transform::Member { chain, pos } => {
            let field_type = Transformer::native_type();
            let contract = Contract {
                field_type: Some(&field_type),
                returns: Returns::OneOf(TRANSFORM_RETURNS),
                params: Some(TRANSFORM_PARAMS),
                unique: true,
            };
            let target = target(chain, &contract, Some(*pos), context)?;
            Ok(match target.member() {
                Member::Field(_) => field_transformer(target),
                Member::Method(_) => method_transformer(target),
            })
        }
    }
}

// =============================================================================
// Mappers
// =============================================================================

fn compile_mappers(mappers: &[ResultMapper], own: &str, context: &mut CompileContext<'_>) {
    for mapper in mappers {
        let (argument, pos) = match &mapper.target {
            None => (Some(own.to_string()).filter(|own| own != FAILED), mapper.pos),
            Some(target) => {
                let resolved = resolve_name(target, context);
                (context.report(resolved), target.position())
            }
        };
        if let Some(argument) = &argument {
            if !context.has_argument(argument) {
                context.warning(
                    Some(pos),
                    format!("Argument '{argument}' doesn't exist in current scope"),
                );
            }
        }
        let argument = argument.unwrap_or_else(|| FAILED.to_string());

        let modifier = compile_mapper(mapper, context);
        if let Some(modifier) = context.report(modifier) {
            context.push_mapper(argument, modifier);
        }
    }
}

fn compile_mapper(mapper: &ResultMapper, context: &CompileContext<'_>) -> Resolved<ArgumentModifier> {
    match &mapper.kind {
        MapperKind::Variable(name) => context.variables().resolve_native(name, mapper.pos),
        MapperKind::Result(chain) => Ok(result_mapper(chain.clone())),
        MapperKind::Member(chain) => {
            let contract = Contract {
                field_type: None,
                returns: Returns::NonVoid,
                params: None,
                unique: false,
            };
            let handler = context.handler();
            chain::compile(handler.class(), chain, &contract)
                .map_err(|f| f.or_at(Some(mapper.pos)))?;
            Ok(handler_mapper(handler.clone(), chain.clone()))
        }
    }
}

// =============================================================================
// Descriptions
// =============================================================================

fn compile_description(
    description: &Description,
    context: &mut CompileContext<'_>,
) -> Resolved<Text> {
    match description {
        Description::Literal { value, .. } => Ok(Text::plain(value.as_str())),
        Description::Translatable { key, .. } => Ok(Text::translatable(key.as_str())),
        Description::Variable { name, pos } => {
            let value = context.variables().resolve(name, *pos, &Type::Any)?;
            match value {
                Value::String(text) => Ok(Text::plain(text.clone())),
                other => other.as_native::<Text>().cloned().ok_or_else(|| {
                    Failure::at(
                        *pos,
                        format!(
                            "Variable '{name}' is defined as {}, must be 'text'",
                            other.value_type()
                        ),
                    )
                }),
            }
        }
        Description::Array { elements, pos } => {
            if elements.is_empty() {
                return Err(Failure::at(*pos, "Empty description"));
            }
            let texts: Vec<_> = elements
                .iter()
                .map(|element| compile_description(element, context))
                .collect();
            let lines = context.report_all(texts);
            if lines.is_empty() {
                return Err(Failure::at(*pos, "Failed to read any elements for description"));
            }
            Ok(Text::lines(lines))
        }
    }
}
