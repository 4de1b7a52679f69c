//! Who runs a command.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use arbor_foundation::{NativeType, PlainRenderer, Text, TextRenderer};

/// The entity executing a command.
///
/// The dispatcher only ever asks two things of a source: whether it holds a
/// permission, and to show it a message.
pub trait CommandSource: Send + Sync {
    /// Returns true if the source holds `permission`.
    fn has_permission(&self, permission: &str) -> bool;

    /// Shows `message` to the source.
    fn send_message(&self, message: &Text);

    /// Display name, used in logs.
    fn name(&self) -> &str {
        "source"
    }
}

impl fmt::Debug for dyn CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandSource({})", self.name())
    }
}

/// A shared command source handle.
pub type SharedSource = Arc<dyn CommandSource>;

/// A named permission.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Permission {
    name: Arc<str>,
}

impl Permission {
    /// Creates a permission.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// The permission node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if `source` holds this permission.
    #[must_use]
    pub fn test(&self, source: &dyn CommandSource) -> bool {
        source.has_permission(&self.name)
    }
}

impl NativeType for Permission {
    const TYPE_NAME: &'static str = "Permission";
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An in-memory source with a fixed permission set that records every
/// message it is sent.
pub struct BasicSource {
    name: String,
    permissions: HashSet<String>,
    operator: bool,
    renderer: Box<dyn TextRenderer>,
    messages: Mutex<Vec<String>>,
}

impl BasicSource {
    /// Creates a source with no permissions.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: HashSet::new(),
            operator: false,
            renderer: Box::new(PlainRenderer),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// A source holding every permission.
    #[must_use]
    pub fn operator(name: impl Into<String>) -> Self {
        Self {
            operator: true,
            ..Self::new(name)
        }
    }

    /// Grants a permission.
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Renders received messages with `renderer` instead of the plain
    /// renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl TextRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Messages received so far, rendered to plain text.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Shares this source.
    #[must_use]
    pub fn shared(self) -> SharedSource {
        Arc::new(self)
    }
}

impl CommandSource for BasicSource {
    fn has_permission(&self, permission: &str) -> bool {
        self.operator || self.permissions.contains(permission)
    }

    fn send_message(&self, message: &Text) {
        let rendered = self.renderer.render_plain(message);
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(rendered);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
