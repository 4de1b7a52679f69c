//! The argument type registry.
//!
//! `argument('n', int(min = 1))` names a type by identifier; the registry
//! maps that identifier to a [`TypeParser`] which turns the options into an
//! [`ArgumentTypeRef`]. Registration is insert-only.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use arbor_dispatch::{
    ArgumentTypeRef, ArrayArgument, BoolArgument, DoubleArgument, EnumArgument, FloatArgument,
    IntegerArgument, LongArgument, MapArgument, StringArgument,
};
use arbor_foundation::{Error, ErrorKind, Result, Type};
use arbor_language::{OptionValue, TokenKind, TypeRef};
use tracing::debug;

use crate::result::{Failure, Resolved};
use crate::variables::Variables;

/// A named type reference being compiled.
#[derive(Clone, Copy, Debug)]
pub struct TypeInfo<'a> {
    /// Registry name.
    pub name: &'a str,
    /// Options by key.
    pub options: &'a BTreeMap<String, OptionValue>,
    /// Position of the type name.
    pub pos: usize,
}

impl<'a> TypeInfo<'a> {
    /// An option, checked against the token kinds it may have.
    ///
    /// # Errors
    /// Fails if the option is present with another kind.
    pub fn option(&self, key: &str, kinds: &[TokenKind]) -> Resolved<Option<&'a OptionValue>> {
        let Some(value) = self.options.get(key) else {
            return Ok(None);
        };
        if kinds.contains(&value.kind) {
            return Ok(Some(value));
        }
        let expected = match kinds {
            [one] => one.name().to_string(),
            _ => format!(
                "one of: {}",
                kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
            ),
        };
        Err(Failure::at(
            value.pos,
            format!("Expected {expected}, found {}", value.kind.name()),
        ))
    }

    /// Like [`TypeInfo::option`], failing when the option is absent.
    ///
    /// # Errors
    /// Fails if the option is missing or has the wrong kind.
    pub fn required(&self, key: &str, kinds: &[TokenKind]) -> Resolved<&'a OptionValue> {
        self.option(key, kinds)?.ok_or_else(|| {
            Failure::at(
                self.pos,
                format!(
                    "Missing required option '{key}' for argument type '{}'",
                    self.name
                ),
            )
        })
    }
}

/// Builds an argument type from a type reference's options.
pub trait TypeParser: Send + Sync {
    /// Parses the options of `info`, reading `@variables` from `variables`.
    ///
    /// # Errors
    /// Describes the first bad option.
    fn parse(&self, info: &TypeInfo<'_>, variables: &Variables) -> Resolved<ArgumentTypeRef>;
}

impl<F> TypeParser for F
where
    F: Fn(&TypeInfo<'_>, &Variables) -> Resolved<ArgumentTypeRef> + Send + Sync,
{
    fn parse(&self, info: &TypeInfo<'_>, variables: &Variables) -> Resolved<ArgumentTypeRef> {
        self(info, variables)
    }
}

/// Maps type names to parsers.
pub struct TypeRegistry {
    parsers: RwLock<HashMap<String, Arc<dyn TypeParser>>>,
}

static GLOBAL: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::with_builtins);

impl TypeRegistry {
    /// A registry with no types.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            parsers: RwLock::new(HashMap::new()),
        }
    }

    /// A registry holding the built-in types.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut parsers: HashMap<String, Arc<dyn TypeParser>> = HashMap::new();
        let mut add = |name: &str, parser: Arc<dyn TypeParser>| {
            parsers.insert(name.to_string(), parser);
        };
        add("bool", fixed(|| ArgumentTypeRef::new(BoolArgument)));
        add("word", fixed(|| ArgumentTypeRef::new(StringArgument::word())));
        add("string", fixed(|| ArgumentTypeRef::new(StringArgument::string())));
        add("greedy_string", fixed(|| ArgumentTypeRef::new(StringArgument::greedy())));
        add("int", Arc::new(|info: &TypeInfo<'_>, _: &Variables| {
            let (min, max) = bounds(info, (i32::MIN, i32::MAX))?;
            Ok(ArgumentTypeRef::new(IntegerArgument::between(min, max)))
        }));
        add("long", Arc::new(|info: &TypeInfo<'_>, _: &Variables| {
            let (min, max) = bounds(info, (i64::MIN, i64::MAX))?;
            Ok(ArgumentTypeRef::new(LongArgument::between(min, max)))
        }));
        add("float", Arc::new(|info: &TypeInfo<'_>, _: &Variables| {
            let (min, max) = bounds(info, (f32::MIN, f32::MAX))?;
            Ok(ArgumentTypeRef::new(FloatArgument::between(min, max)))
        }));
        add("double", Arc::new(|info: &TypeInfo<'_>, _: &Variables| {
            let (min, max) = bounds(info, (f64::MIN, f64::MAX))?;
            Ok(ArgumentTypeRef::new(DoubleArgument::between(min, max)))
        }));
        add("map", Arc::new(parse_map));
        add("array", Arc::new(parse_array));
        add("enum", Arc::new(parse_enum));
        Self {
            parsers: RwLock::new(parsers),
        }
    }

    /// The process-wide registry, created with the built-ins on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Adds a type.
    ///
    /// # Errors
    /// Fails if `name` is already registered.
    pub fn register(&self, name: impl Into<String>, parser: impl TypeParser + 'static) -> Result<()> {
        let name = name.into();
        let mut parsers = self.parsers.write().unwrap_or_else(PoisonError::into_inner);
        if parsers.contains_key(&name) {
            return Err(Error::new(ErrorKind::DuplicateType(name)));
        }
        debug!(name = %name, "registered argument type");
        parsers.insert(name, Arc::new(parser));
        Ok(())
    }

    /// The parser registered as `name`.
    #[must_use]
    pub fn parser(&self, name: &str) -> Option<Arc<dyn TypeParser>> {
        let parsers = self.parsers.read().unwrap_or_else(PoisonError::into_inner);
        parsers.get(name).cloned()
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let parsers = self.parsers.read().unwrap_or_else(PoisonError::into_inner);
        parsers.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let parsers = self.parsers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = parsers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Compiles a type reference.
    ///
    /// # Errors
    /// Fails on unknown types, unbound variables and bad options.
    pub fn resolve(&self, reference: &TypeRef, variables: &Variables) -> Resolved<ArgumentTypeRef> {
        match reference {
            TypeRef::Variable { name, pos } => variables.resolve_native::<ArgumentTypeRef>(name, *pos),
            TypeRef::Named { name, options, pos } => {
                let parser = self.parser(name).ok_or_else(|| {
                    Failure::at(*pos, format!("Unknown argument type '{name}'"))
                })?;
                let info = TypeInfo {
                    name,
                    options,
                    pos: *pos,
                };
                parser.parse(&info, variables)
            }
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("names", &self.names())
            .finish()
    }
}

// =============================================================================
// Built-in parsers
// =============================================================================

fn fixed(make: fn() -> ArgumentTypeRef) -> Arc<dyn TypeParser> {
    Arc::new(move |_: &TypeInfo<'_>, _: &Variables| Ok(make()))
}

fn bounds<T>(info: &TypeInfo<'_>, full: (T, T)) -> Resolved<(T, T)>
where
    T: FromStr + PartialOrd + fmt::Display + Copy,
{
    let read = |key: &str, default: T| -> Resolved<T> {
        match info.option(key, &[TokenKind::Number])? {
            None => Ok(default),
            Some(token) => token.value.parse().map_err(|_| {
                Failure::at(token.pos, format!("Invalid {} '{}'", info.name, token.value))
            }),
        }
    };
    let min = read("min", full.0)?;
    let max = read("max", full.1)?;
    if min > max {
        return Err(Failure::at(
            info.pos,
            format!("Min value {min} larger than max value {max}"),
        ));
    }
    Ok((min, max))
}

fn parse_map(info: &TypeInfo<'_>, variables: &Variables) -> Resolved<ArgumentTypeRef> {
    let token = info.required("values", &[TokenKind::Variable])?;
    let value = variables.resolve(&token.value, token.pos, &Type::map(Type::Any))?;
    let map = value.as_map().cloned().unwrap_or_default();
    Ok(ArgumentTypeRef::new(MapArgument::new(map)))
}

fn parse_array(info: &TypeInfo<'_>, variables: &Variables) -> Resolved<ArgumentTypeRef> {
    let token = info.required("values", &[TokenKind::Variable])?;
    let element = variables.resolve_native::<ArgumentTypeRef>(&token.value, token.pos)?;
    Ok(ArgumentTypeRef::new(ArrayArgument::new(element)))
}

fn parse_enum(info: &TypeInfo<'_>, variables: &Variables) -> Resolved<ArgumentTypeRef> {
    let token = info.required("values", &[TokenKind::Variable])?;
    let value = variables.resolve(&token.value, token.pos, &Type::list(Type::String))?;
    let choices: Option<Vec<String>> = value
        .as_list()
        .map(|list| list.iter().map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    match choices {
        Some(choices) if !choices.is_empty() => Ok(ArgumentTypeRef::new(EnumArgument::new(choices))),
        _ => Err(Failure::at(
            token.pos,
            format!(
                "Variable '{}' must be a non-empty list of strings for argument type '{}'",
                token.value, info.name
            ),
        )),
    }
}
