//! Type descriptors for reflected members and variables.

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Type descriptor.
///
/// Describes field types, method parameter and return types, and the
/// expected type of a variable lookup. Host types (commands, predicates,
/// argument types, ...) are [`Type::Native`] tagged by name.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Type {
    /// The nil type. As a return type: the method returns nothing.
    Nil,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// String type.
    String,
    /// Homogeneous list type.
    List(Box<Type>),
    /// String-keyed map type.
    Map(Box<Type>),
    /// Optional type (value or nil).
    Option(Box<Type>),
    /// A host type identified by name.
    Native(&'static str),
    /// Any type (accepts any value).
    Any,
}

impl Type {
    /// Creates a list type with the given element type.
    #[must_use]
    pub fn list(element: Type) -> Self {
        Self::List(Box::new(element))
    }

    /// Creates a map type with the given value type.
    #[must_use]
    pub fn map(value: Type) -> Self {
        Self::Map(Box::new(value))
    }

    /// Creates an optional type.
    #[must_use]
    pub fn option(inner: Type) -> Self {
        Self::Option(Box::new(inner))
    }

    /// Returns true if this type is `Any`.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns true if this is the nil type.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns true if a nil value is a valid instance of this type.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nil | Self::Option(_) | Self::Any)
    }

    /// Checks if a value of type `value_type` is accepted by this type.
    ///
    /// - `Any` accepts all types
    /// - `Option(T)` accepts `Nil` and anything `T` accepts
    /// - `Float` accepts `Int`
    /// - collections accept runtime collections whose element type is `Any`
    #[must_use]
    pub fn accepts(&self, value_type: &Type) -> bool {
        if self.is_any() {
            return true;
        }

        if let Self::Option(inner) = self {
            return value_type.is_nil() || inner.accepts(value_type);
        }

        match (self, value_type) {
            (Self::Nil, Self::Nil)
            | (Self::Bool, Self::Bool)
            | (Self::Int | Self::Float, Self::Int)
            | (Self::Float, Self::Float)
            | (Self::String, Self::String) => true,
            (Self::List(expected), Self::List(actual))
            | (Self::Map(expected), Self::Map(actual)) => {
                actual.is_any() || expected.accepts(actual)
            }
            (Self::Native(a), Self::Native(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::List(t) => write!(f, "list<{t:?}>"),
            Self::Map(t) => write!(f, "map<{t:?}>"),
            Self::Option(t) => write!(f, "{t:?}?"),
            Self::Native(name) => write!(f, "{name}"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_accepts_everything() {
        assert!(Type::Any.accepts(&Type::Int));
        assert!(Type::Any.accepts(&Type::Native("Command")));
    }

    #[test]
    fn float_accepts_int() {
        assert!(Type::Float.accepts(&Type::Int));
        assert!(!Type::Int.accepts(&Type::Float));
    }

    #[test]
    fn option_accepts_nil() {
        let t = Type::option(Type::String);
        assert!(t.accepts(&Type::Nil));
        assert!(t.accepts(&Type::String));
        assert!(!t.accepts(&Type::Int));
        assert!(t.is_nullable());
        assert!(!Type::String.is_nullable());
    }

    #[test]
    fn natives_match_by_name() {
        assert!(Type::Native("Command").accepts(&Type::Native("Command")));
        assert!(!Type::Native("Command").accepts(&Type::Native("Predicate")));
    }

    #[test]
    fn runtime_collections_are_accepted() {
        assert!(Type::list(Type::String).accepts(&Type::list(Type::Any)));
        assert!(!Type::list(Type::String).accepts(&Type::list(Type::Int)));
    }

    #[test]
    fn display_names() {
        assert_eq!(Type::option(Type::list(Type::Int)).to_string(), "list<int>?");
        assert_eq!(Type::Native("Suggestions").to_string(), "Suggestions");
    }
}
