//! Member chains such as `settings.limits().max`.
//!
//! A chain is checked once against the handler's [`Class`] when the command
//! compiles, producing the terminal [`Member`]. At call time
//! [`resolve_last`] walks every link but the last against the live object,
//! and the caller invokes the terminal member on what it returns.

use std::sync::Arc;

use arbor_foundation::{Error, Result, Type, Value};
use arbor_language::{MemberChain, MemberKind};
use tracing::trace;

use crate::reflect::{Class, Field, Method, Object};
use crate::result::{Failure, Resolved};

/// The member a chain ends in.
#[derive(Clone, Debug)]
pub enum Member {
    /// A field whose value is used as-is.
    Field(Arc<Field>),
    /// A method invoked with filled parameters.
    Method(Arc<Method>),
}

/// Acceptable return types of a terminal method.
#[derive(Clone, Copy, Debug)]
pub enum Returns {
    /// Anything except nothing.
    NonVoid,
    /// One of the listed types.
    OneOf(&'static [Type]),
}

impl Returns {
    fn accepts(self, ty: &Type) -> bool {
        match self {
            Self::NonVoid => !ty.is_nil(),
            Self::OneOf(types) => types.contains(ty),
        }
    }

    fn describe(self) -> String {
        match self {
            Self::NonVoid => "non-void".to_string(),
            Self::OneOf([only]) => only.to_string(),
            Self::OneOf(types) => types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }
}

/// What the last link of a chain must look like.
#[derive(Clone, Copy, Debug)]
pub struct Contract<'a> {
    /// Required declared type of a terminal field. `None` accepts any field.
    pub field_type: Option<&'a Type>,
    /// Required return type of a terminal method.
    pub returns: Returns,
    /// If set, the terminal method is looked up by exactly these parameter
    /// types instead of by name alone.
    pub params: Option<&'a [Type]>,
    /// If false, several methods of the same name are allowed and the first
    /// one is returned.
    pub unique: bool,
}

/// Validates `chain` against `class`, returning the terminal member.
///
/// # Errors
/// Describes the first link that does not exist or has the wrong shape.
pub fn compile(class: &Arc<Class>, chain: &MemberChain, contract: &Contract<'_>) -> Resolved<Member> {
    trace!(class = class.name(), chain = %chain, "compiling member chain");
    let mut current = Arc::clone(class);
    let mut link = chain;
    while let Some(next) = link.next.as_deref() {
        current = step(&current, link)?;
        link = next;
    }
    terminal(&current, link, contract)
}

fn step(class: &Class, link: &MemberChain) -> Resolved<Arc<Class>> {
    match link.kind {
        MemberKind::Field => {
            let field = class
                .field(&link.name)
                .ok_or_else(|| no_such_field(&link.name, class))?;
            field.class().cloned().ok_or_else(|| {
                Failure::new(format!(
                    "Field '{}' in {class} has no members to access",
                    link.name
                ))
            })
        }
        MemberKind::Method => {
            let method = class.method_with(&link.name, &[]).ok_or_else(|| {
                Failure::new(format!(
                    "No such method '{}' in {class} with params []",
                    link.name
                ))
            })?;
            if method.is_void() {
                return Err(Failure::new(format!(
                    "Method {} in {class} returns void when a return type is required",
                    link.name
                )));
            }
            method.class().cloned().ok_or_else(|| {
                Failure::new(format!(
                    "Method '{}' in {class} has no members to access",
                    link.name
                ))
            })
        }
    }
}

fn no_such_field(name: &str, class: &Class) -> Failure {
    Failure::new(format!("No such field '{name}' in {class}"))
}

fn terminal(class: &Class, link: &MemberChain, contract: &Contract<'_>) -> Resolved<Member> {
    match link.kind {
        MemberKind::Field => {
            let field = class
                .field(&link.name)
                .ok_or_else(|| no_such_field(&link.name, class))?;
            if let Some(expected) = contract.field_type {
                if !expected.accepts(field.ty()) {
                    return Err(Failure::new(format!(
                        "Field '{}' in {class} must return {expected}",
                        link.name
                    )));
                }
            }
            Ok(Member::Field(Arc::clone(field)))
        }
        MemberKind::Method => {
            let method = match contract.params {
                Some(params) => find_exact(class, &link.name, params)?,
                None => find_by_name(class, &link.name, contract.unique)?,
            };
            if !contract.returns.accepts(method.returns()) {
                return Err(Failure::new(format!(
                    "Invalid return type {} for method '{}' in {class}, must be {}",
                    method.returns(),
                    link.name,
                    contract.returns.describe()
                )));
            }
            Ok(Member::Method(method))
        }
    }
}

fn find_exact(class: &Class, name: &str, params: &[Type]) -> Resolved<Arc<Method>> {
    class.method_with(name, params).cloned().ok_or_else(|| {
        let listed = params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Failure::new(format!(
            "No such method '{name}' in {class} with params [{listed}]"
        ))
    })
}

fn find_by_name(class: &Class, name: &str, unique: bool) -> Resolved<Arc<Method>> {
    let mut matching = class.methods_named(name);
    let Some(first) = matching.next() else {
        return Err(Failure::new(format!(
            "No method named '{name}' found in {class}"
        )));
    };
    if unique && matching.next().is_some() {
        return Err(Failure::new(format!(
            "Found too many methods named '{name}' in {class}. Cannot resolve a single one"
        )));
    }
    Ok(Arc::clone(first))
}

/// Performs a single access: reads a field or calls a parameterless method.
///
/// # Errors
/// Fails if the member does not exist or the call fails.
pub fn resolve(object: &Object, link: &MemberChain) -> Result<Value> {
    match link.kind {
        MemberKind::Field => object.get(&link.name),
        MemberKind::Method => object.call(&link.name),
    }
}

/// Walks every link but the last, returning the object the last link is
/// accessed on, together with that link.
///
/// # Errors
/// Fails if an access fails or an intermediate value is not an object.
pub fn resolve_last<'c>(object: &Object, chain: &'c MemberChain) -> Result<(Object, &'c MemberChain)> {
    let mut current = object.clone();
    let mut link = chain;
    while let Some(next) = link.next.as_deref() {
        let value = resolve(&current, link)?;
        current = Object::from_value(&value).ok_or_else(|| {
            Error::reflection(format!(
                "'{}' in {} returned {}, which has no members",
                link.name,
                current.class(),
                value.value_type()
            ))
        })?;
        link = next;
    }
    Ok((current, link))
}
