//! Registers command trees and runs input against them.

use std::collections::BTreeMap;
use std::sync::Arc;

use arbor_foundation::{Result, StringReader, SyntaxError};
use tracing::debug;

use crate::context::CommandContext;
use crate::function::Command;
use crate::node::CommandNode;
use crate::source::SharedSource;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// The outcome of parsing one input line.
#[derive(Clone, Debug)]
pub struct ParseResults {
    /// Arguments parsed along the matched path.
    pub context: CommandContext,
    /// Nodes matched, outermost first.
    pub nodes: Vec<Arc<CommandNode>>,
    /// Action of the last matched node.
    pub command: Option<Command>,
    /// Reader positioned where matching stopped.
    pub reader: StringReader,
    /// Failures from the branches that were tried at the stopping point.
    pub errors: Vec<SyntaxError>,
}

impl ParseResults {
    fn rank(&self) -> (bool, bool) {
        (!self.reader.can_read(), self.errors.is_empty())
    }
}

/// Owns registered command trees.
#[derive(Debug, Default)]
pub struct Dispatcher {
    commands: BTreeMap<String, Arc<CommandNode>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level command and one copy per alias, replacing any
    /// command of the same name.
    pub fn register(&mut self, node: CommandNode) -> Arc<CommandNode> {
        let node = Arc::new(node);
        for alias in node.aliases() {
            self.commands
                .insert(alias.clone(), Arc::new(node.renamed(alias)));
        }
        debug!(
            command = node.name(),
            aliases = node.aliases().len(),
            nodes = node.node_count(),
            "registered command"
        );
        self.commands
            .insert(node.name().to_string(), Arc::clone(&node));
        node
    }

    /// Removes a top-level command and its aliases.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<CommandNode>> {
        let node = self.commands.remove(name)?;
        for alias in node.aliases() {
            self.commands.remove(alias);
        }
        Some(node)
    }

    /// Looks up a top-level command or alias.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<CommandNode>> {
        self.commands.get(name)
    }

    /// Top-level names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    fn roots(&self) -> Vec<Arc<CommandNode>> {
        self.commands.values().cloned().collect()
    }

    /// Matches `input` as far as possible.
    #[must_use]
    pub fn parse(&self, input: &str, source: SharedSource) -> ParseResults {
        let state = ParseResults {
            context: CommandContext::new(source, input),
            nodes: Vec::new(),
            command: None,
            reader: StringReader::new(input),
            errors: Vec::new(),
        };
        parse_nodes(&self.roots(), state)
    }

    /// Parses and runs `input`.
    ///
    /// # Errors
    /// Fails with a positioned syntax error when the input matches no
    /// executable path, or with whatever the action returns.
    pub fn execute(&self, input: &str, source: SharedSource) -> Result<i32> {
        let parsed = self.parse(input, source);
        Self::execute_parsed(parsed)
    }

    /// Runs an already parsed input.
    ///
    /// # Errors
    /// See [`Dispatcher::execute`].
    pub fn execute_parsed(mut parsed: ParseResults) -> Result<i32> {
        if parsed.reader.can_read() {
            let err = if parsed.errors.len() == 1 {
                parsed.errors.remove(0)
            } else if parsed.nodes.is_empty() {
                SyntaxError::unknown_command().at(&parsed.reader)
            } else {
                SyntaxError::unknown_argument().at(&parsed.reader)
            };
            return Err(err.into());
        }
        let Some(command) = parsed.command else {
            return Err(SyntaxError::unknown_command().at(&parsed.reader).into());
        };
        debug!(
            input = parsed.reader.string(),
            source = parsed.context.source().name(),
            "executing command"
        );
        command.run(&parsed.context)
    }

    /// Completions for the last space-separated token of `input`.
    #[must_use]
    pub fn suggestions(&self, input: &str, source: SharedSource) -> Suggestions {
        let start = input.rfind(' ').map_or(0, |i| i + 1);
        let (candidates, context) = if start == 0 {
            (self.roots(), CommandContext::new(source, input))
        } else {
            let parsed = self.parse(&input[..start - 1], source);
            let Some(last) = parsed.nodes.last() else {
                return Suggestions::empty();
            };
            if parsed.reader.can_read() {
                return Suggestions::empty();
            }
            (last.children().to_vec(), parsed.context)
        };

        let all = candidates
            .iter()
            .filter(|c| c.can_use(context.source()))
            .map(|c| c.list_suggestions(&context, SuggestionsBuilder::new(input, start)));
        Suggestions::merge(all.collect::<Vec<_>>())
    }

    /// Every executable path under `name` that `source` may use, as usage
    /// strings such as `give <target> <amount>`.
    #[must_use]
    pub fn usage(&self, name: &str, source: &SharedSource) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(root) = self.commands.get(name) {
            if root.can_use(&**source) {
                collect_usage(root, name.to_string(), source, &mut out);
            }
        }
        out
    }
}

fn collect_usage(node: &CommandNode, prefix: String, source: &SharedSource, out: &mut Vec<String>) {
    if node.command().is_some() {
        out.push(prefix.clone());
    }
    for child in node.children() {
        if child.can_use(&**source) {
            collect_usage(child, format!("{prefix} {}", child.usage_text()), source, out);
        }
    }
}

/// Literals whose name equals the next word win outright; otherwise every
/// argument child is tried.
fn relevant<'a>(candidates: &'a [Arc<CommandNode>], reader: &StringReader) -> Vec<&'a Arc<CommandNode>> {
    let rest = reader.remaining();
    let word = rest.split(' ').next().unwrap_or(rest);
    if let Some(literal) = candidates.iter().find(|c| c.is_literal() && c.name() == word) {
        return vec![literal];
    }
    candidates.iter().filter(|c| !c.is_literal()).collect()
}

fn parse_nodes(candidates: &[Arc<CommandNode>], state: ParseResults) -> ParseResults {
    let mut best: Option<ParseResults> = None;
    let mut errors = Vec::new();

    for child in relevant(candidates, &state.reader) {
        if !child.can_use(state.context.source()) {
            continue;
        }
        let mut reader = state.reader.clone();
        let mut context = state.context.clone();
        if let Err(e) = child.parse(&mut reader, &mut context) {
            errors.push(e);
            continue;
        }
        if reader.peek().is_some_and(|c| c != ' ') {
            errors.push(SyntaxError::expected_separator().at(&reader));
            continue;
        }

        let mut nodes = state.nodes.clone();
        nodes.push(Arc::clone(child));
        let mut next = ParseResults {
            context,
            nodes,
            command: child.command().cloned(),
            reader,
            errors: Vec::new(),
        };
        // A lone trailing space leaves the reader on the separator.
        if next.reader.remaining().len() >= 2 {
            next.reader.skip();
            next = parse_nodes(child.children(), next);
        }

        if next.rank() == (true, true) {
            return next;
        }
        if best.as_ref().is_none_or(|b| next.rank() > b.rank()) {
            best = Some(next);
        }
    }

    best.unwrap_or(ParseResults { errors, ..state })
}
