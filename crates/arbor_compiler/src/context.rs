//! Per-registration compile state.
//!
//! A [`CompileContext`] lives for exactly one registration. Besides the
//! read-only inputs (variables, type registry, handler, options) it owns the
//! diagnostics, the usage entries recorded so far and four scope stacks:
//! visible argument names, pending result mappers, usage labels and active
//! conditions. The compiler takes a [`Mark`] before a node and restores it
//! afterwards, so every push is undone whether or not the node compiled.

use arbor_dispatch::{ArgumentModifier, Requirement};
use arbor_foundation::Text;

use crate::compiled::ContextFactory;
use crate::diagnostics::{Diagnostics, Severity};
use crate::options::RegistrarOptions;
use crate::reflect::Object;
use crate::result::{report_all, Resolved, ResolvedExt};
use crate::types::TypeRegistry;
use crate::variables::Variables;

/// A usage line recorded while compiling, before the command name is known
/// to the sink.
#[derive(Clone)]
pub struct Usage {
    /// Labels from below the root down to the node, space separated.
    pub usage: String,
    /// The node's description.
    pub description: Text,
    /// Conditions active at the node.
    pub condition: Option<Requirement>,
}

/// Stack heights at some point of the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark {
    arguments: usize,
    mappers: usize,
    labels: usize,
    conditions: usize,
}

/// State threaded through one compilation.
pub struct CompileContext<'a> {
    variables: &'a Variables,
    types: &'a TypeRegistry,
    handler: &'a Object,
    options: &'a RegistrarOptions,
    diagnostics: Diagnostics,
    usages: Vec<Usage>,
    arguments: Vec<String>,
    mappers: Vec<(String, ArgumentModifier)>,
    labels: Vec<String>,
    conditions: Vec<Requirement>,
}

impl<'a> CompileContext<'a> {
    /// Starts a compilation.
    #[must_use]
    pub fn new(
        variables: &'a Variables,
        types: &'a TypeRegistry,
        handler: &'a Object,
        options: &'a RegistrarOptions,
    ) -> Self {
        Self {
            variables,
            types,
            handler,
            options,
            diagnostics: Diagnostics::new(),
            usages: Vec::new(),
            arguments: Vec::new(),
            mappers: Vec::new(),
            labels: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Variables visible to the command.
    #[must_use]
    pub fn variables(&self) -> &'a Variables {
        self.variables
    }

    /// Argument type parsers.
    #[must_use]
    pub fn types(&self) -> &'a TypeRegistry {
        self.types
    }

    /// The object the command was declared on.
    #[must_use]
    pub fn handler(&self) -> &'a Object {
        self.handler
    }

    /// Registration settings.
    #[must_use]
    pub fn options(&self) -> &'a RegistrarOptions {
        self.options
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Everything reported so far.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Records an error.
    pub fn error(&mut self, position: Option<usize>, message: impl Into<String>) {
        self.diagnostics.error(position, message);
    }

    /// Records a warning.
    pub fn warning(&mut self, position: Option<usize>, message: impl Into<String>) {
        self.diagnostics.warning(position, message);
    }

    /// Records a diagnostic of the given severity.
    pub fn push_diagnostic(
        &mut self,
        severity: Severity,
        position: Option<usize>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(severity, position, message);
    }

    /// Records a failure and returns the success value, if any.
    pub fn report<T>(&mut self, result: Resolved<T>) -> Option<T> {
        result.report(&mut self.diagnostics)
    }

    /// Records a failure and substitutes `fallback`.
    pub fn report_or<T>(&mut self, result: Resolved<T>, fallback: T) -> T {
        result.report_or(&mut self.diagnostics, fallback)
    }

    /// Records every failure, keeping the successes in order.
    pub fn report_all<T>(&mut self, results: impl IntoIterator<Item = Resolved<T>>) -> Vec<T> {
        report_all(results, &mut self.diagnostics)
    }

    /// Gives mutable access for APIs that take the collector directly.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    // =========================================================================
    // Scope stacks
    // =========================================================================

    /// Current stack heights.
    #[must_use]
    pub fn mark(&self) -> Mark {
        Mark {
            arguments: self.arguments.len(),
            mappers: self.mappers.len(),
            labels: self.labels.len(),
            conditions: self.conditions.len(),
        }
    }

    /// Pops everything pushed since `mark`.
    pub fn restore(&mut self, mark: Mark) {
        self.arguments.truncate(mark.arguments);
        self.mappers.truncate(mark.mappers);
        self.labels.truncate(mark.labels);
        self.conditions.truncate(mark.conditions);
    }

    /// Runs `f`, then pops whatever it pushed.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mark = self.mark();
        let result = f(self);
        self.restore(mark);
        result
    }

    /// Makes an argument name visible to the current subtree.
    pub fn push_argument(&mut self, name: impl Into<String>) {
        self.arguments.push(name.into());
    }

    /// Returns true if `name` is visible.
    #[must_use]
    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.iter().any(|a| a == name)
    }

    /// Visible argument names, outermost first.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Adds a mapper for `argument`.
    pub fn push_mapper(&mut self, argument: impl Into<String>, mapper: ArgumentModifier) {
        self.mappers.push((argument.into(), mapper));
    }

    /// Adds a usage label.
    pub fn push_label(&mut self, label: impl Into<String>) {
        self.labels.push(label.into());
    }

    /// Adds an active condition.
    pub fn push_condition(&mut self, condition: Requirement) {
        self.conditions.push(condition);
    }

    /// All active conditions combined.
    #[must_use]
    pub fn conditions(&self) -> Option<Requirement> {
        Requirement::all(self.conditions.clone())
    }

    /// The current usage path.
    #[must_use]
    pub fn usage_prefix(&self) -> String {
        self.labels.join(" ")
    }

    /// A factory applying every mapper in scope.
    #[must_use]
    pub fn context_factory(&self) -> ContextFactory {
        ContextFactory::new(&self.mappers)
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// The permission a command without one receives.
    #[must_use]
    pub fn defaulted_permission(&self, command: &str) -> Option<String> {
        self.options
            .default_permission_format
            .as_ref()
            .map(|format| format.replace("{command}", command))
    }

    /// Records a usage line at the current position.
    pub fn add_usage(&mut self, description: Text) {
        self.usages.push(Usage {
            usage: self.usage_prefix(),
            description,
            condition: self.conditions(),
        });
    }

    /// Usage lines recorded so far.
    #[must_use]
    pub fn usages(&self) -> &[Usage] {
        &self.usages
    }

    /// Ends the compilation.
    #[must_use]
    pub fn finish(self) -> (Diagnostics, Vec<Usage>) {
        (self.diagnostics, self.usages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ClassBuilder;
    use arbor_dispatch::BasicSource;

    struct Handler;

    fn with_context(f: impl FnOnce(&mut CompileContext<'_>)) {
        let variables = Variables::new();
        let types = TypeRegistry::with_builtins();
        let handler = Object::new(ClassBuilder::<Handler>::new("Handler").build(), Handler);
        let options = RegistrarOptions::default().with_default_permission("cmd.{command}");
        let mut context = CompileContext::new(&variables, &types, &handler, &options);
        f(&mut context);
    }

    #[test]
    fn scoped_pops_everything() {
        with_context(|context| {
            context.push_argument("outer");
            context.scoped(|inner| {
                inner.push_argument("player");
                inner.push_label("<player>");
                inner.push_condition(Requirement::always());
                inner.push_mapper("player", ArgumentModifier::new(|_, v| Ok(v)));
                assert!(inner.has_argument("player"));
                assert!(!inner.context_factory().is_empty());
            });
            assert!(context.has_argument("outer"));
            assert!(!context.has_argument("player"));
            assert!(context.conditions().is_none());
            assert!(context.context_factory().is_empty());
            assert_eq!(context.usage_prefix(), "");
        });
    }

    #[test]
    fn usage_lines_carry_prefix_and_conditions() {
        with_context(|context| {
            context.push_label("<player>");
            context.push_label("kill");
            context.push_condition(Requirement::new(|s| s.has_permission("kill")));
            context.add_usage(Text::plain("Kills a player"));
            let usage = &context.usages()[0];
            assert_eq!(usage.usage, "<player> kill");
            let condition = usage.condition.as_ref().unwrap();
            assert!(!condition.test(&BasicSource::new("a")));
            assert!(condition.test(&BasicSource::new("a").with_permission("kill")));
        });
    }

    #[test]
    fn default_permission_substitutes_command() {
        with_context(|context| {
            assert_eq!(context.defaulted_permission("ban").as_deref(), Some("cmd.ban"));
        });
    }
}
