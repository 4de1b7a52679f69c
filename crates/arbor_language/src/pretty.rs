//! Pretty-printer for command trees.
//!
//! Prints a [`Root`] back to grammar source. The output reparses to a tree
//! with the same structure; positions are not preserved.
//!
//! # Example
//!
//! ```
//! use arbor_language::{ParseOptions, parse, pretty::pretty_print};
//!
//! let root = parse("name='greet' executes=run()", &ParseOptions::default()).unwrap();
//! assert_eq!(pretty_print(&root), "name = 'greet'\nexecutes = run()\n");
//! ```

use std::fmt::Write;

use crate::ast::{
    Body, Description, Executes, MapperKind, Name, Node, NodeKind, OptionValue, Requires,
    ResultMapper, Root, Suggests, Transform, TypeRef,
};
use crate::token::TokenKind;

/// Configuration for pretty-printing.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Number of spaces for each indentation level.
    pub indent_width: usize,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Pretty-print a command tree.
#[must_use]
pub fn pretty_print(root: &Root) -> String {
    pretty_print_with_config(root, &PrettyConfig::default())
}

/// Pretty-print a command tree with custom configuration.
#[must_use]
pub fn pretty_print_with_config(root: &Root, config: &PrettyConfig) -> String {
    let mut printer = PrettyPrinter {
        config,
        output: String::new(),
        depth: 0,
    };
    printer.print_root(root);
    printer.output
}

/// Quotes `s` with single quotes, escaping `'` and `\`.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

struct PrettyPrinter<'c> {
    config: &'c PrettyConfig,
    output: String,
    depth: usize,
}

impl PrettyPrinter<'_> {
    fn line(&mut self, text: &str) {
        let indent = self.depth * self.config.indent_width;
        let _ = writeln!(self.output, "{:indent$}{text}", "");
    }

    fn print_root(&mut self, root: &Root) {
        self.line(&format!("name = {}", name(&root.body.name)));
        if let Some(permission) = &root.permission {
            self.line(&format!("permission = {}", name(permission)));
        }
        if !root.aliases.is_empty() {
            let aliases: Vec<String> = root.aliases.iter().map(name).collect();
            self.line(&format!("aliases = {}", aliases.join(" | ")));
        }
        if root.plain_translation {
            self.line("translate_plain = true");
        }
        self.print_body(&root.body);
    }

    fn print_body(&mut self, body: &Body) {
        if let Some(description) = &body.description {
            self.line(&format!("description = {}", self::description(description)));
        }
        if let Some(label) = &body.label {
            self.line(&format!("label = {}", name(label)));
        }
        if let Some(requires) = &body.requires {
            self.line(&format!("requires = {}", self::requires(requires)));
        }
        if let Some(executes) = &body.executes {
            self.line(&format!("executes = {}", self::executes(executes)));
        }
        for mapper in &body.mappers {
            self.line(&self::mapper(mapper));
        }
        for transform in &body.transforms {
            self.line(&format!("transform = {}", self::transform(transform)));
        }
        for child in &body.children {
            self.print_node(child);
        }
    }

    fn print_node(&mut self, node: &Node) {
        let header = match &node.kind {
            NodeKind::Literal => format!("literal({})", name(&node.body.name)),
            NodeKind::Argument { ty, .. } => {
                format!("argument({}, {})", name(&node.body.name), type_ref(ty))
            }
        };

        let suggests = match &node.kind {
            NodeKind::Argument {
                suggests: Some(s), ..
            } => Some(s),
            _ => None,
        };
        let body = &node.body;
        let is_empty = suggests.is_none()
            && body.description.is_none()
            && body.label.is_none()
            && body.requires.is_none()
            && body.executes.is_none()
            && body.mappers.is_empty()
            && body.transforms.is_empty()
            && body.children.is_empty();

        if is_empty {
            self.line(&format!("{header} {{}}"));
            return;
        }

        self.line(&format!("{header} {{"));
        self.depth += 1;
        if let Some(suggests) = suggests {
            self.line(&format!("suggests = {}", self::suggests(suggests)));
        }
        self.print_body(body);
        self.depth -= 1;
        self.line("}");
    }
}

fn name(name: &Name) -> String {
    match name {
        Name::Literal { value, .. } => quote(value),
        Name::Field { name, .. } => name.clone(),
        Name::Variable { name, .. } => format!("@{name}"),
    }
}

fn description(description: &Description) -> String {
    match description {
        Description::Literal { value, .. } => quote(value),
        Description::Variable { name, .. } => format!("@{name}"),
        Description::Translatable { key, .. } => format!("translatable({})", quote(key)),
        Description::Array { elements, .. } => {
            let elements: Vec<String> = elements.iter().map(self::description).collect();
            format!("[{}]", elements.join(", "))
        }
    }
}

fn requires(requires: &Requires) -> String {
    match requires {
        Requires::Variable { name, .. } => format!("@{name}"),
        Requires::Constant { value, .. } => value.to_string(),
        Requires::Permission { name, .. } => format!("permission({})", self::name(name)),
        Requires::Member { chain, .. } => chain.path(),
    }
}

fn executes(executes: &Executes) -> String {
    match executes {
        Executes::Variable { name, .. } => format!("@{name}"),
        Executes::Member { chain, .. } => chain.path(),
    }
}

fn suggests(suggests: &Suggests) -> String {
    match suggests {
        Suggests::Variable { name, .. } => format!("@{name}"),
        Suggests::Strings { values, .. } => {
            let values: Vec<String> = values.iter().map(|v| quote(v)).collect();
            format!("[{}]", values.join(", "))
        }
        Suggests::Member { chain, .. } => chain.path(),
    }
}

fn transform(transform: &Transform) -> String {
    match transform {
        Transform::Variable { name, .. } => format!("@{name}"),
        Transform::Member { chain, .. } => chain.path(),
    }
}

fn mapper(mapper: &ResultMapper) -> String {
    let target = mapper
        .target
        .as_ref()
        .map_or_else(String::new, |t| format!("({})", name(t)));
    let value = match &mapper.kind {
        MapperKind::Variable(v) => format!("@{v}"),
        MapperKind::Result(chain) => format!("result.{}", chain.path()),
        MapperKind::Member(chain) => chain.path(),
    };
    format!("map_result{target} = {value}")
}

fn type_ref(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Variable { name, .. } => format!("@{name}"),
        TypeRef::Named { name, options, .. } if options.is_empty() => name.clone(),
        TypeRef::Named { name, options, .. } => {
            let options: Vec<String> = options
                .iter()
                .map(|(key, value)| format!("{key} = {}", option_value(value)))
                .collect();
            format!("{name}({})", options.join(", "))
        }
    }
}

fn option_value(value: &OptionValue) -> String {
    match value.kind {
        TokenKind::QuotedString => quote(&value.value),
        TokenKind::Variable => format!("@{}", value.value),
        kind => kind
            .character()
            .map_or_else(|| value.text().to_string(), String::from),
    }
}
