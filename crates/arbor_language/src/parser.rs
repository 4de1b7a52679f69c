//! Recursive-descent parser for the command-tree grammar.
//!
//! ```text
//! name = 'greet'
//! permission = 'example.greet'
//! aliases = hello | hi
//!
//! argument('target', word) {
//!   suggests = ['world', 'there']
//!   executes = greetTarget()
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ast::{
    Body, Description, Executes, MapperKind, MemberChain, MemberKind, Name, Node, NodeKind,
    OptionValue, Requires, ResultMapper, Root, Suggests, Transform, TypeRef,
};
use crate::lexer::Lexer;
use crate::report::ParseResult;
use crate::token::TokenKind;

use TokenKind as K;

const ROOT_FIELDS: &[TokenKind] = &[
    K::Permission,
    K::Aliases,
    K::Description,
    K::Argument,
    K::Executes,
    K::Requires,
    K::Literal,
    K::MapResult,
    K::Label,
    K::Transform,
    K::TranslatePlain,
];

const ARGUMENT_FIELDS: &[TokenKind] = &[
    K::Executes,
    K::Suggests,
    K::Requires,
    K::Argument,
    K::Literal,
    K::MapResult,
    K::Description,
    K::Label,
    K::Transform,
];

const LITERAL_FIELDS: &[TokenKind] = &[
    K::Executes,
    K::Requires,
    K::Argument,
    K::Literal,
    K::MapResult,
    K::Description,
    K::Label,
    K::Transform,
];

/// When a configured default action is attached to the root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DefaultExecutesRule {
    /// Whenever the root has no `executes`.
    IfMissing,
    /// Only when the root has no `executes` and no children.
    #[default]
    IfNoChildren,
}

/// Parser settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParseOptions {
    /// Default action reference: `@variable` or a method name.
    pub default_executes: Option<String>,
    /// When the default action applies.
    pub default_rule: DefaultExecutesRule,
}

impl ParseOptions {
    /// Sets the default action reference.
    #[must_use]
    pub fn with_default_executes(mut self, reference: impl Into<String>) -> Self {
        self.default_executes = Some(reference.into());
        self
    }

    /// Sets the default action rule.
    #[must_use]
    pub const fn with_default_rule(mut self, rule: DefaultExecutesRule) -> Self {
        self.default_rule = rule;
        self
    }
}

/// A single-valued node field, as named in redefinition errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// `executes`
    Executes,
    /// `requires`
    Requires,
    /// `description`
    Description,
    /// `label`
    Label,
    /// `suggests`
    Suggests,
    /// `permission`
    Permission,
    /// `aliases`
    Aliases,
}

impl FieldKey {
    /// The field's keyword.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Executes => "executes",
            Self::Requires => "requires",
            Self::Description => "description",
            Self::Label => "label",
            Self::Suggests => "suggests",
            Self::Permission => "permission",
            Self::Aliases => "aliases",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a token stream into a [`Root`].
pub struct Parser<'r> {
    lexer: Lexer<'r>,
    options: ParseOptions,
}

impl<'r> Parser<'r> {
    /// Creates a parser reading from `lexer`.
    #[must_use]
    pub fn new(lexer: Lexer<'r>, options: ParseOptions) -> Self {
        Self { lexer, options }
    }

    /// Parses a whole command.
    ///
    /// # Errors
    /// Fails on the first lexical or grammatical error.
    pub fn parse(&mut self) -> ParseResult<Root> {
        self.lexer.expect(&[K::Name])?;
        self.lexer.expect(&[K::Assign])?;
        let mut root = Root::new(self.parse_name(false)?);

        while self.lexer.has_next() {
            if self.parse_body_field(&mut root.body)? {
                continue;
            }

            let field = self.lexer.expect(ROOT_FIELDS)?;
            self.lexer.expect(&[K::Assign])?;

            match field.kind {
                K::TranslatePlain => {
                    let value = self.lexer.expect(&[K::True, K::False])?;
                    root.plain_translation = value.is(K::True);
                }
                K::Permission => {
                    self.ensure_unset(root.permission.is_some(), FieldKey::Permission, &root.body)?;
                    root.permission = Some(self.parse_name(false)?);
                }
                K::Aliases => {
                    self.ensure_unset(!root.aliases.is_empty(), FieldKey::Aliases, &root.body)?;
                    root.aliases = self.parse_aliases()?;
                }
                _ => {}
            }
        }

        if let Some(executes) = self.default_executes(&root) {
            root.body.executes = Some(executes);
        }

        Ok(root)
    }

    fn default_executes(&self, root: &Root) -> Option<Executes> {
        let reference = self.options.default_executes.as_deref()?;
        if root.body.executes.is_some() || reference.is_empty() {
            return None;
        }
        if self.options.default_rule == DefaultExecutesRule::IfNoChildren
            && !root.body.children.is_empty()
        {
            return None;
        }
        Some(match reference.strip_prefix('@') {
            Some(name) => Executes::Variable {
                name: name.to_string(),
                pos: None,
            },
            None => Executes::Member {
                chain: MemberChain::method(reference),
                pos: None,
            },
        })
    }

    fn parse_aliases(&mut self) -> ParseResult<Vec<Name>> {
        let mut aliases = vec![self.parse_name(true)?];
        while self.lexer.peek()?.is(K::Wall) {
            self.lexer.next()?;
            aliases.push(self.parse_name(true)?);
        }
        Ok(aliases)
    }

    /// Parses `literal(name)` and its body.
    ///
    /// # Errors
    /// Fails on the first lexical or grammatical error.
    pub fn parse_literal(&mut self) -> ParseResult<Node> {
        let start = self.lexer.expect(&[K::Literal])?.position();
        self.lexer.expect(&[K::BracketOpen])?;
        let name = self.parse_name(false)?;
        self.lexer.expect(&[K::BracketClose])?;

        let mut body = Body::new(name, start);
        self.parse_node_body(&mut body, &mut |parser, body| {
            if !parser.parse_body_field(body)? {
                parser.lexer.expect(LITERAL_FIELDS)?;
            }
            Ok(())
        })?;

        Ok(Node {
            kind: NodeKind::Literal,
            body,
        })
    }

    /// Parses `argument(name, type)` and its body.
    ///
    /// # Errors
    /// Fails on the first lexical or grammatical error.
    pub fn parse_argument(&mut self) -> ParseResult<Node> {
        let start = self.lexer.expect(&[K::Argument])?.position();
        self.lexer.expect(&[K::BracketOpen])?;
        let name = self.parse_name(false)?;
        if self.lexer.peek()?.is(K::Comma) {
            self.lexer.next()?;
        }
        let ty = self.parse_type_ref()?;
        self.lexer.expect(&[K::BracketClose])?;

        let mut body = Body::new(name, start);
        let mut suggests = None;
        self.parse_node_body(&mut body, &mut |parser, body| {
            if parser.parse_body_field(body)? {
                return Ok(());
            }
            if parser.lexer.peek()?.is(K::Suggests) {
                parser.lexer.next()?;
                parser.lexer.expect(&[K::Assign])?;
                parser.ensure_unset(suggests.is_some(), FieldKey::Suggests, body)?;
                suggests = Some(parser.parse_suggests()?);
                return Ok(());
            }
            parser.lexer.expect(ARGUMENT_FIELDS)?;
            Ok(())
        })?;

        Ok(Node {
            kind: NodeKind::Argument { ty, suggests },
            body,
        })
    }

    /// `= executes`, `{ fields }` or `.child(...)`.
    fn parse_node_body(
        &mut self,
        body: &mut Body,
        scope_field: &mut dyn FnMut(&mut Self, &mut Body) -> ParseResult<()>,
    ) -> ParseResult<()> {
        let next = self.lexer.peek()?.kind;

        if next == K::Assign {
            self.lexer.next()?;
            return self.parse_executes_field(body);
        }

        if next == K::ScopeBegin {
            return self.parse_delimited(K::ScopeBegin, K::ScopeEnd, false, &mut |parser| {
                scope_field(parser, body)
            });
        }

        self.lexer.expect(&[K::Dot, K::ScopeBegin, K::Assign])?;
        let next = self.lexer.peek()?.kind;
        let child = match next {
            K::Argument => self.parse_argument()?,
            K::Literal => self.parse_literal()?,
            _ => {
                self.lexer.expect(&[K::Literal, K::Argument])?;
                return Ok(());
            }
        };
        body.children.push(child);
        Ok(())
    }

    /// Parses one field shared by all nodes. Returns false, consuming
    /// nothing, if the next token does not start one.
    fn parse_body_field(&mut self, body: &mut Body) -> ParseResult<bool> {
        let next = self.lexer.peek()?.kind;
        match next {
            K::Executes => {
                self.lexer.next()?;
                self.lexer.expect(&[K::Assign])?;
                self.parse_executes_field(body)?;
            }
            K::Requires => {
                self.lexer.next()?;
                self.lexer.expect(&[K::Assign])?;
                self.ensure_unset(body.requires.is_some(), FieldKey::Requires, body)?;
                body.requires = Some(self.parse_requires()?);
            }
            K::Literal => {
                let child = self.parse_literal()?;
                body.children.push(child);
            }
            K::Argument => {
                let child = self.parse_argument()?;
                body.children.push(child);
            }
            K::Description => {
                self.lexer.next()?;
                self.lexer.expect(&[K::Assign])?;
                self.ensure_unset(body.description.is_some(), FieldKey::Description, body)?;
                body.description = Some(self.parse_description(true)?);
            }
            K::Label => {
                self.lexer.next()?;
                self.lexer.expect(&[K::Assign])?;
                self.ensure_unset(body.label.is_some(), FieldKey::Label, body)?;
                body.label = Some(self.parse_name(false)?);
            }
            K::MapResult => {
                let mapper = self.parse_mapper()?;
                body.mappers.push(mapper);
            }
            K::Transform => {
                self.lexer.next()?;
                self.lexer.expect(&[K::Assign])?;
                let transform = self.parse_transform()?;
                body.transforms.push(transform);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn parse_executes_field(&mut self, body: &mut Body) -> ParseResult<()> {
        self.ensure_unset(body.executes.is_some(), FieldKey::Executes, body)?;
        body.executes = Some(self.parse_executes()?);
        Ok(())
    }

    fn ensure_unset(&self, is_set: bool, field: FieldKey, body: &Body) -> ParseResult<()> {
        if is_set {
            return Err(self.lexer.error(
                self.lexer.last_start(),
                format!("Tried to redefine '{field}' of node '{}'", body.name),
            ));
        }
        Ok(())
    }

    fn parse_type_ref(&mut self) -> ParseResult<TypeRef> {
        if self.lexer.peek()?.is(K::Variable) {
            let token = self.lexer.next()?;
            return Ok(TypeRef::Variable {
                pos: token.position(),
                name: token.value,
            });
        }

        let token = self.lexer.expect(&[K::Identifier])?;
        let mut options = BTreeMap::new();
        if self.lexer.peek()?.is(K::BracketOpen) {
            self.parse_delimited(K::BracketOpen, K::BracketClose, true, &mut |parser| {
                let key = parser.lexer.expect(&[K::Identifier])?;
                parser.lexer.expect(&[K::Assign])?;
                let value = parser.lexer.next()?;
                options.insert(
                    key.value,
                    OptionValue {
                        kind: value.kind,
                        pos: value.position(),
                        value: value.value,
                    },
                );
                Ok(())
            })?;
        }

        Ok(TypeRef::Named {
            pos: token.position(),
            name: token.value,
            options,
        })
    }

    fn parse_description(&mut self, allow_array: bool) -> ParseResult<Description> {
        let start = self.lexer.peek()?.position();

        if allow_array && self.lexer.peek()?.is(K::SquareOpen) {
            let mut elements = Vec::new();
            self.parse_delimited(K::SquareOpen, K::SquareClose, true, &mut |parser| {
                elements.push(parser.parse_description(false)?);
                Ok(())
            })?;
            return Ok(Description::Array {
                elements,
                pos: start,
            });
        }

        let kinds: &[TokenKind] = if allow_array {
            &[K::QuotedString, K::SquareOpen, K::Variable, K::Translatable]
        } else {
            &[K::QuotedString, K::Variable, K::Translatable]
        };
        let token = self.lexer.expect(kinds)?;

        Ok(match token.kind {
            K::QuotedString => Description::Literal {
                value: token.value,
                pos: start,
            },
            K::Variable => Description::Variable {
                name: token.value,
                pos: start,
            },
            _ => {
                self.lexer.expect(&[K::BracketOpen])?;
                let key = self.lexer.expect(&[K::QuotedString])?;
                self.lexer.expect(&[K::BracketClose])?;
                Description::Translatable {
                    key: key.value,
                    pos: start,
                }
            }
        })
    }

    fn parse_suggests(&mut self) -> ParseResult<Suggests> {
        let peek = self.lexer.peek()?;
        let start = peek.position();

        if peek.is(K::Variable) {
            return Ok(Suggests::Variable {
                name: self.lexer.next()?.value,
                pos: start,
            });
        }

        if !peek.is(K::SquareOpen) {
            return Ok(Suggests::Member {
                chain: self.parse_member_chain()?,
                pos: start,
            });
        }

        let mut values = Vec::new();
        self.parse_delimited(K::SquareOpen, K::SquareClose, true, &mut |parser| {
            values.push(parser.lexer.expect(&[K::QuotedString])?.value);
            Ok(())
        })?;
        Ok(Suggests::Strings { values, pos: start })
    }

    fn parse_requires(&mut self) -> ParseResult<Requires> {
        let peek = self.lexer.peek()?;
        let (kind, start) = (peek.kind, peek.position());

        match kind {
            K::Variable => Ok(Requires::Variable {
                name: self.lexer.next()?.value,
                pos: start,
            }),
            K::True | K::False => Ok(Requires::Constant {
                value: self.lexer.next()?.is(K::True),
                pos: start,
            }),
            K::Permission => {
                self.lexer.next()?;
                self.lexer.expect(&[K::BracketOpen])?;
                let name = self.parse_name(false)?;
                self.lexer.expect(&[K::BracketClose])?;
                Ok(Requires::Permission { name, pos: start })
            }
            _ => Ok(Requires::Member {
                chain: self.parse_member_chain()?,
                pos: start,
            }),
        }
    }

    fn parse_executes(&mut self) -> ParseResult<Executes> {
        let peek = self.lexer.peek()?;
        let start = Some(peek.position());

        if peek.is(K::Variable) {
            return Ok(Executes::Variable {
                name: self.lexer.next()?.value,
                pos: start,
            });
        }
        Ok(Executes::Member {
            chain: self.parse_member_chain()?,
            pos: start,
        })
    }

    fn parse_transform(&mut self) -> ParseResult<Transform> {
        let peek = self.lexer.peek()?;
        let start = peek.position();

        if peek.is(K::Variable) {
            return Ok(Transform::Variable {
                name: self.lexer.next()?.value,
                pos: start,
            });
        }
        Ok(Transform::Member {
            chain: self.parse_member_chain()?,
            pos: start,
        })
    }

    fn parse_mapper(&mut self) -> ParseResult<ResultMapper> {
        self.lexer.expect(&[K::MapResult])?;

        let mut target = None;
        if self.lexer.peek()?.is(K::BracketOpen) {
            self.lexer.next()?;
            let peek = self.lexer.peek()?;
            if peek.is_any(&[K::QuotedString, K::Variable, K::Identifier]) {
                target = Some(self.parse_name(false)?);
            } else if !peek.is(K::BracketClose) {
                self.lexer.expect(&[
                    K::BracketClose,
                    K::QuotedString,
                    K::Variable,
                    K::Identifier,
                ])?;
            }
            self.lexer.expect(&[K::BracketClose])?;
        }

        self.lexer.expect(&[K::Assign])?;
        let peek = self.lexer.peek()?;
        let pos = peek.position();

        let kind = if peek.is(K::Variable) {
            MapperKind::Variable(self.lexer.next()?.value)
        } else if peek.is(K::Identifier) && peek.value == "result" {
            self.lexer.next()?;
            self.lexer.expect(&[K::Dot])?;
            MapperKind::Result(self.parse_member_chain()?)
        } else {
            MapperKind::Member(self.parse_member_chain()?)
        };

        Ok(ResultMapper { target, kind, pos })
    }

    fn parse_name(&mut self, allow_identifier: bool) -> ParseResult<Name> {
        let token = self
            .lexer
            .expect(&[K::Identifier, K::QuotedString, K::Variable])?;
        let pos = token.position();

        Ok(match token.kind {
            K::Variable => Name::Variable {
                name: token.value,
                pos,
            },
            K::Identifier if !allow_identifier => Name::Field {
                name: token.value,
                pos,
            },
            _ => Name::Literal {
                value: token.value,
                pos,
            },
        })
    }

    fn parse_member_chain(&mut self) -> ParseResult<MemberChain> {
        let name = self.lexer.expect(&[K::Identifier])?.value;

        let kind = if self.lexer.peek()?.is(K::BracketOpen) {
            self.lexer.next()?;
            self.lexer.expect(&[K::BracketClose])?;
            MemberKind::Method
        } else {
            MemberKind::Field
        };

        let next = if self.lexer.peek()?.is(K::Dot) {
            self.lexer.next()?;
            Some(Box::new(self.parse_member_chain()?))
        } else {
            None
        };

        Ok(MemberChain { name, kind, next })
    }

    /// Runs `element` until `close`. With `require_comma`, elements must be
    /// separated by commas; a trailing comma is allowed.
    fn parse_delimited(
        &mut self,
        open: TokenKind,
        close: TokenKind,
        require_comma: bool,
        element: &mut dyn FnMut(&mut Self) -> ParseResult<()>,
    ) -> ParseResult<()> {
        self.lexer.expect(&[open])?;

        while !self.lexer.peek()?.is(close) {
            element(self)?;

            if require_comma {
                let next = self.lexer.peek()?.kind;
                if next == K::Comma {
                    self.lexer.next()?;
                    continue;
                }
                if next == close {
                    break;
                }
                self.lexer.expect(&[K::Comma, close])?;
            }
        }

        self.lexer.expect(&[close])?;
        Ok(())
    }
}
