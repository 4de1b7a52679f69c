//! Abstract syntax tree for the command-tree grammar.
//!
//! One [`Root`] is produced per input string. Every tree carries the byte
//! offset of the token that introduced it so semantic diagnostics can point
//! back into the source.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::token::TokenKind;

/// A node name, permission, alias or label.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Name {
    /// `'text'`, or a bare identifier where identifiers are plain names.
    Literal {
        /// The name itself.
        value: String,
        /// Token position.
        pos: usize,
    },
    /// A bare identifier naming a text field on the handler.
    Field {
        /// Field name.
        name: String,
        /// Token position.
        pos: usize,
    },
    /// `@variable`
    Variable {
        /// Variable name.
        name: String,
        /// Token position.
        pos: usize,
    },
}

impl Name {
    /// Token position.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::Literal { pos, .. } | Self::Field { pos, .. } | Self::Variable { pos, .. } => {
                *pos
            }
        }
    }

    /// The literal value, field name or variable name.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Literal { value, .. } => value,
            Self::Field { name, .. } | Self::Variable { name, .. } => name,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { value, .. } => f.write_str(value),
            Self::Field { name, .. } => f.write_str(name),
            Self::Variable { name, .. } => write!(f, "@{name}"),
        }
    }
}

/// Whether a chain link reads a field or calls a method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MemberKind {
    /// `name`
    Field,
    /// `name()`
    Method,
}

/// A dotted chain of member accesses such as `config.commands().greet`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MemberChain {
    /// Member name.
    pub name: String,
    /// Field or method.
    pub kind: MemberKind,
    /// The next link, if any.
    pub next: Option<Box<MemberChain>>,
}

impl MemberChain {
    /// A single-link chain.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            next: None,
        }
    }

    /// A single zero-argument method call.
    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Method)
    }

    /// A single field read.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Field)
    }

    /// Appends `next` after this link.
    #[must_use]
    pub fn then(mut self, next: MemberChain) -> Self {
        self.next = Some(Box::new(match self.next.take() {
            Some(existing) => existing.then(next),
            None => next,
        }));
        self
    }

    /// Iterates the links from first to last.
    pub fn links(&self) -> impl Iterator<Item = &MemberChain> {
        std::iter::successors(Some(self), |link| link.next.as_deref())
    }

    /// The terminal link.
    #[must_use]
    pub fn last(&self) -> &MemberChain {
        self.links().last().unwrap_or(self)
    }

    /// Number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links().count()
    }

    /// Always false; a chain has at least one link.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Source form, e.g. `a.b().c`.
    #[must_use]
    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MemberChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, link) in self.links().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&link.name)?;
            if link.kind == MemberKind::Method {
                f.write_str("()")?;
            }
        }
        Ok(())
    }
}

/// `executes = …`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Executes {
    /// `@command`
    Variable {
        /// Variable name.
        name: String,
        /// Token position; `None` for an injected default.
        pos: Option<usize>,
    },
    /// `run()` or `handlers.greet`
    Member {
        /// The member chain.
        chain: MemberChain,
        /// Token position; `None` for an injected default.
        pos: Option<usize>,
    },
}

impl Executes {
    /// Token position, if the tree came from source.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Variable { pos, .. } | Self::Member { pos, .. } => *pos,
        }
    }
}

/// `requires = …`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Requires {
    /// `@predicate`
    Variable {
        /// Variable name.
        name: String,
        /// Token position.
        pos: usize,
    },
    /// `true` or `false`
    Constant {
        /// The constant.
        value: bool,
        /// Token position.
        pos: usize,
    },
    /// `permission('node')`
    Permission {
        /// The permission name.
        name: Name,
        /// Token position.
        pos: usize,
    },
    /// `canUse()`
    Member {
        /// The member chain.
        chain: MemberChain,
        /// Token position.
        pos: usize,
    },
}

impl Requires {
    /// Token position.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::Variable { pos, .. }
            | Self::Constant { pos, .. }
            | Self::Permission { pos, .. }
            | Self::Member { pos, .. } => *pos,
        }
    }
}

/// `suggests = …`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Suggests {
    /// `@provider`
    Variable {
        /// Variable name.
        name: String,
        /// Token position.
        pos: usize,
    },
    /// `['a', 'b']`
    Strings {
        /// The suggested strings.
        values: Vec<String>,
        /// Token position.
        pos: usize,
    },
    /// `suggestNames()`
    Member {
        /// The member chain.
        chain: MemberChain,
        /// Token position.
        pos: usize,
    },
}

impl Suggests {
    /// Token position.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::Variable { pos, .. } | Self::Strings { pos, .. } | Self::Member { pos, .. } => {
                *pos
            }
        }
    }
}

/// `description = …`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Description {
    /// `'text'`
    Literal {
        /// The text.
        value: String,
        /// Token position.
        pos: usize,
    },
    /// `@text`
    Variable {
        /// Variable name.
        name: String,
        /// Token position.
        pos: usize,
    },
    /// `translatable('key')`
    Translatable {
        /// Translation key.
        key: String,
        /// Token position.
        pos: usize,
    },
    /// `[ d1, d2 ]`, joined with newlines. Only at the top level.
    Array {
        /// The elements.
        elements: Vec<Description>,
        /// Token position.
        pos: usize,
    },
}

impl Description {
    /// Token position.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::Literal { pos, .. }
            | Self::Variable { pos, .. }
            | Self::Translatable { pos, .. }
            | Self::Array { pos, .. } => *pos,
        }
    }
}

/// The token bound to a type option, e.g. `max = 5`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OptionValue {
    /// Kind of the value token.
    pub kind: TokenKind,
    /// Value token text; empty for keywords and punctuation.
    pub value: String,
    /// Token position.
    pub pos: usize,
}

impl OptionValue {
    /// Value text, or the keyword spelling for keyword tokens such as `true`.
    #[must_use]
    pub fn text(&self) -> &str {
        if self.value.is_empty() {
            self.kind.name()
        } else {
            &self.value
        }
    }
}

/// Argument type reference.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TypeRef {
    /// `@argument_type`
    Variable {
        /// Variable name.
        name: String,
        /// Token position.
        pos: usize,
    },
    /// `int(min = 1, max = 5)`
    Named {
        /// Registry name.
        name: String,
        /// Options in key order.
        options: BTreeMap<String, OptionValue>,
        /// Token position.
        pos: usize,
    },
}

impl TypeRef {
    /// Token position.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::Variable { pos, .. } | Self::Named { pos, .. } => *pos,
        }
    }

    /// The type name or variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Variable { name, .. } | Self::Named { name, .. } => name,
        }
    }

    /// An option of a named type.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        match self {
            Self::Named { options, .. } => options.get(key),
            Self::Variable { .. } => None,
        }
    }
}

/// How a result mapper produces the new value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MapperKind {
    /// `@modifier`
    Variable(String),
    /// `result.trim()`: a chain invoked on the argument value.
    Result(MemberChain),
    /// `normalize()`: a chain on the handler that receives the value.
    Member(MemberChain),
}

/// `map_result[(target)] = …`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ResultMapper {
    /// Argument the mapper applies to; `None` means the node's own argument.
    pub target: Option<Name>,
    /// The mapping.
    pub kind: MapperKind,
    /// Token position.
    pub pos: usize,
}

/// `transform = …`, applied to the node builder after children are added.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Transform {
    /// `@transformer`
    Variable {
        /// Variable name.
        name: String,
        /// Token position.
        pos: usize,
    },
    /// `addDebugChild()`
    Member {
        /// The member chain.
        chain: MemberChain,
        /// Token position.
        pos: usize,
    },
}

impl Transform {
    /// Token position.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::Variable { pos, .. } | Self::Member { pos, .. } => *pos,
        }
    }
}

/// Fields shared by every node kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Body {
    /// Node name.
    pub name: Name,
    /// Action run when the command ends at this node.
    pub executes: Option<Executes>,
    /// Requirement a source must meet to use this node.
    pub requires: Option<Requires>,
    /// Help text.
    pub description: Option<Description>,
    /// Usage label replacing the node's name in syntax listings.
    pub label: Option<Name>,
    /// Child nodes in source order.
    pub children: Vec<Node>,
    /// Argument value mappers in source order.
    pub mappers: Vec<ResultMapper>,
    /// Node transforms in source order.
    pub transforms: Vec<Transform>,
    /// Position of the introducing keyword; 0 for the root.
    pub start: usize,
}

impl Body {
    /// An empty body.
    #[must_use]
    pub fn new(name: Name, start: usize) -> Self {
        Self {
            name,
            executes: None,
            requires: None,
            description: None,
            label: None,
            children: Vec::new(),
            mappers: Vec::new(),
            transforms: Vec::new(),
            start,
        }
    }
}

/// What sort of child node a [`Node`] is.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum NodeKind {
    /// `literal('name')`
    Literal,
    /// `argument('name', type)`
    Argument {
        /// The argument type.
        ty: TypeRef,
        /// Suggestion override.
        suggests: Option<Suggests>,
    },
}

/// A literal or argument node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Node {
    /// Literal or argument.
    pub kind: NodeKind,
    /// Shared fields.
    pub body: Body,
}

impl Node {
    /// Returns true for argument nodes.
    #[must_use]
    pub const fn is_argument(&self) -> bool {
        matches!(self.kind, NodeKind::Argument { .. })
    }
}

/// The command itself.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Root {
    /// Shared fields.
    pub body: Body,
    /// Permission required to use the command.
    pub permission: Option<Name>,
    /// Alternative command names.
    pub aliases: Vec<Name>,
    /// Whether translatable descriptions render as plain text.
    pub plain_translation: bool,
}

impl Root {
    /// A root with only a name.
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self {
            body: Body::new(name, 0),
            permission: None,
            aliases: Vec::new(),
            plain_translation: false,
        }
    }

    /// Counts the root and every descendant.
    #[must_use]
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.body.children)).sum()
        }
        1 + count(&self.body.children)
    }
}
