//! Command tree nodes and their builder.

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{ReadResult, StringReader, SyntaxError, Text};
use tracing::debug;

use crate::argument::ArgumentTypeRef;
use crate::context::{CommandContext, ParsedArgument};
use crate::function::{Command, Requirement, SuggestionProvider};
use crate::source::CommandSource;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// What a node matches.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// A fixed word.
    Literal(Arc<str>),
    /// A parsed value bound to a name.
    Argument {
        /// Name the value is stored under.
        name: Arc<str>,
        /// How the value is parsed.
        ty: ArgumentTypeRef,
        /// Custom completions, replacing the type's own.
        suggestions: Option<SuggestionProvider>,
    },
}

/// One node of a command tree. Immutable once built.
#[derive(Clone)]
pub struct CommandNode {
    kind: NodeKind,
    command: Option<Command>,
    requirement: Option<Requirement>,
    description: Option<Text>,
    children: Vec<Arc<CommandNode>>,
    permission: Option<String>,
    aliases: Vec<String>,
    plain_translation: bool,
}

impl CommandNode {
    /// The literal word or argument name.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Literal(name) | NodeKind::Argument { name, .. } => name,
        }
    }

    /// What this node matches.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns true for literal nodes.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal(_))
    }

    /// The argument type, for argument nodes.
    #[must_use]
    pub fn argument_type(&self) -> Option<&ArgumentTypeRef> {
        match &self.kind {
            NodeKind::Argument { ty, .. } => Some(ty),
            NodeKind::Literal(_) => None,
        }
    }

    /// The custom suggestion provider, for argument nodes.
    #[must_use]
    pub fn suggestion_provider(&self) -> Option<&SuggestionProvider> {
        match &self.kind {
            NodeKind::Argument { suggestions, .. } => suggestions.as_ref(),
            NodeKind::Literal(_) => None,
        }
    }

    /// The action run when input ends at this node.
    #[must_use]
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    /// Who may use this node.
    #[must_use]
    pub fn requirement(&self) -> Option<&Requirement> {
        self.requirement.as_ref()
    }

    /// Help text.
    #[must_use]
    pub fn description(&self) -> Option<&Text> {
        self.description.as_ref()
    }

    /// Child nodes in insertion order.
    #[must_use]
    pub fn children(&self) -> &[Arc<CommandNode>] {
        &self.children
    }

    /// Finds a child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Arc<CommandNode>> {
        self.children.iter().find(|c| c.name() == name)
    }

    /// Permission guarding a top-level command.
    #[must_use]
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Alternative names of a top-level command.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Returns true if descriptions should be shown untranslated.
    #[must_use]
    pub fn plain_translation(&self) -> bool {
        self.plain_translation
    }

    /// Returns true if `source` holds the permission and passes the
    /// requirement.
    #[must_use]
    pub fn can_use(&self, source: &dyn CommandSource) -> bool {
        self.permission.as_deref().is_none_or(|p| source.has_permission(p))
            && self.requirement.as_ref().is_none_or(|r| r.test(source))
    }

    /// `name` for literals, `<name>` for arguments.
    #[must_use]
    pub fn usage_text(&self) -> String {
        match &self.kind {
            NodeKind::Literal(name) => name.to_string(),
            NodeKind::Argument { name, .. } => format!("<{name}>"),
        }
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// A copy answering to a different literal, without aliases.
    #[must_use]
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            kind: NodeKind::Literal(name.into()),
            aliases: Vec::new(),
            ..self.clone()
        }
    }

    /// Consumes this node's input, recording argument values in `context`.
    ///
    /// # Errors
    /// Fails when the input does not match.
    pub fn parse(&self, reader: &mut StringReader, context: &mut CommandContext) -> ReadResult<()> {
        match &self.kind {
            NodeKind::Literal(literal) => {
                let start = reader.cursor();
                let rest = reader.remaining();
                let matches = rest.starts_with(&**literal)
                    && rest[literal.len()..].chars().next().is_none_or(|c| c == ' ');
                if matches {
                    reader.set_cursor(start + literal.len());
                    Ok(())
                } else {
                    Err(SyntaxError::expected_literal(literal).at(reader))
                }
            }
            NodeKind::Argument { name, ty, .. } => {
                let start = reader.cursor();
                let value = ty.parse(reader)?;
                context.put_argument(
                    Arc::clone(name),
                    ParsedArgument {
                        range: (start, reader.cursor()),
                        value,
                    },
                );
                Ok(())
            }
        }
    }

    /// Completions for the partial token in `builder`.
    #[must_use]
    pub fn list_suggestions(&self, context: &CommandContext, mut builder: SuggestionsBuilder) -> Suggestions {
        match &self.kind {
            NodeKind::Literal(literal) => {
                builder.suggest_matching(literal.to_string());
                builder.build()
            }
            NodeKind::Argument {
                suggestions: Some(provider),
                name,
                ..
            } => provider.suggest(context, builder).unwrap_or_else(|e| {
                debug!(argument = %name, error = %e, "suggestion provider failed");
                Suggestions::empty()
            }),
            NodeKind::Argument { ty, .. } => ty.list_suggestions(context, builder),
        }
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("kind", &self.kind)
            .field("executable", &self.command.is_some())
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Builds a [`CommandNode`].
///
/// Setters take `&mut self` so a transformer handed a builder can edit it
/// in place.
#[derive(Clone, Debug)]
pub struct NodeBuilder {
    node: CommandNode,
}

impl NodeBuilder {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            node: CommandNode {
                kind,
                command: None,
                requirement: None,
                description: None,
                children: Vec::new(),
                permission: None,
                aliases: Vec::new(),
                plain_translation: false,
            },
        }
    }

    /// Starts a literal node.
    #[must_use]
    pub fn literal(name: impl Into<Arc<str>>) -> Self {
        Self::with_kind(NodeKind::Literal(name.into()))
    }

    /// Starts an argument node.
    #[must_use]
    pub fn argument(name: impl Into<Arc<str>>, ty: ArgumentTypeRef) -> Self {
        Self::with_kind(NodeKind::Argument {
            name: name.into(),
            ty,
            suggestions: None,
        })
    }

    /// The node name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.node.name()
    }

    /// Returns true for literal builders.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.node.is_literal()
    }

    /// The action set so far.
    #[must_use]
    pub fn get_command(&self) -> Option<&Command> {
        self.node.command.as_ref()
    }

    /// Children added so far.
    #[must_use]
    pub fn children(&self) -> &[Arc<CommandNode>] {
        &self.node.children
    }

    /// Sets the action.
    pub fn executes(&mut self, command: Command) -> &mut Self {
        self.node.command = Some(command);
        self
    }

    /// Sets the requirement.
    pub fn requires(&mut self, requirement: Requirement) -> &mut Self {
        self.node.requirement = Some(requirement);
        self
    }

    /// Sets custom suggestions. Ignored on literal nodes.
    pub fn suggests(&mut self, provider: SuggestionProvider) -> &mut Self {
        if let NodeKind::Argument { suggestions, .. } = &mut self.node.kind {
            *suggestions = Some(provider);
        }
        self
    }

    /// Sets the help text.
    pub fn description(&mut self, description: Text) -> &mut Self {
        self.node.description = Some(description);
        self
    }

    /// Sets the top-level permission.
    pub fn permission(&mut self, permission: impl Into<String>) -> &mut Self {
        self.node.permission = Some(permission.into());
        self
    }

    /// Adds a top-level alias.
    pub fn alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.node.aliases.push(alias.into());
        self
    }

    /// Sets the plain-translation flag.
    pub fn plain_translation(&mut self, plain: bool) -> &mut Self {
        self.node.plain_translation = plain;
        self
    }

    /// Adds a child. A child with the same name is merged: the new action
    /// wins and grandchildren are merged recursively.
    pub fn then(&mut self, child: CommandNode) -> &mut Self {
        add_child(&mut self.node.children, child);
        self
    }

    /// Finishes the node.
    #[must_use]
    pub fn build(&self) -> CommandNode {
        self.node.clone()
    }
}

fn add_child(children: &mut Vec<Arc<CommandNode>>, child: CommandNode) {
    let existing = children
        .iter_mut()
        .find(|c| c.name() == child.name() && c.is_literal() == child.is_literal());
    match existing {
        Some(existing) => {
            let existing = Arc::make_mut(existing);
            if child.command.is_some() {
                existing.command = child.command;
            }
            for grandchild in child.children {
                add_child(
                    &mut existing.children,
                    Arc::unwrap_or_clone(grandchild),
                );
            }
        }
        None => children.push(Arc::new(child)),
    }
}
