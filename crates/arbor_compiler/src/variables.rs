//! Named values referenced from command text as `@name`.

use std::sync::Arc;

use arbor_foundation::{Error, ErrorKind, NativeType, Result, SharedMap, Type, Value};

use crate::result::{Failure, Resolved};

/// A variable map whose keys are checked on insertion.
///
/// Keys must look like identifiers: a letter, `_` or `$`, followed by
/// letters, digits, `_` or `$`. Clones share structure, so handing a copy to
/// every registration is cheap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variables {
    map: SharedMap<Arc<str>, Value>,
}

impl Variables {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variable, replacing any previous value.
    ///
    /// # Errors
    /// Fails if `key` is not identifier-shaped.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        validate_key(key)?;
        self.map.set(key.into(), value.into());
        Ok(())
    }

    /// Inserts a variable, returning the map.
    ///
    /// # Errors
    /// Fails if `key` is not identifier-shaped.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Returns true if `key` is bound.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no variables are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over all bindings in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (&**k, v))
    }

    /// Looks up a variable referenced at `pos` and checks its type.
    ///
    /// # Errors
    /// Fails if the variable is unbound or `expected` does not accept it.
    pub fn resolve(&self, name: &str, pos: usize, expected: &Type) -> Resolved<&Value> {
        let value = self
            .get(name)
            .ok_or_else(|| Failure::at(pos, format!("Variable '{name}' not found")))?;
        let actual = value.value_type();
        if !expected.accepts(&actual) {
            return Err(Failure::at(
                pos,
                format!("Variable '{name}' is defined as {actual}, must be '{expected}'"),
            ));
        }
        Ok(value)
    }

    /// Looks up a host value of type `T`.
    ///
    /// # Errors
    /// Fails if the variable is unbound or holds something else.
    pub fn resolve_native<T: NativeType + Clone>(&self, name: &str, pos: usize) -> Resolved<T> {
        let value = self.resolve(name, pos, &T::native_type())?;
        value.as_native::<T>().cloned().ok_or_else(|| {
            Failure::at(pos, format!("Variable '{name}' is not a {}", T::TYPE_NAME))
        })
    }

    /// Both maps' bindings. On conflicts `local` wins.
    #[must_use]
    pub fn merged(&self, local: &Variables) -> Self {
        Self {
            map: self.map.union(&local.map),
        }
    }
}

fn invalid(message: String) -> Error {
    Error::new(ErrorKind::InvalidVariableName { message })
}

/// Checks that `key` is identifier-shaped.
///
/// # Errors
/// Describes the first offending character.
pub fn validate_key(key: &str) -> Result<()> {
    let mut chars = key.chars();
    let Some(first) = chars.next().filter(|_| !key.trim().is_empty()) else {
        return Err(invalid(format!("Variable name '{key}' is blank")));
    };
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return Err(invalid(format!(
            "Illegal starting character '{first}', must be a-z, A-Z, '_' or '$'"
        )));
    }
    for (i, c) in chars.enumerate() {
        if !(c.is_alphanumeric() || c == '_' || c == '$') {
            return Err(invalid(format!(
                "Illegal character '{c}' at index {}, must be a-z, A-Z, 0-9, '_' or '$'",
                i + 1
            )));
        }
    }
    Ok(())
}
