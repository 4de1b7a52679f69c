//! Structured text and the rendering hook.
//!
//! Descriptions, reader errors and argument-parse errors carry [`Text`]
//! rather than plain strings so a host can localize them. Whenever a
//! component needs plain text (diagnostics, logs) it goes through a
//! [`TextRenderer`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::NativeType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A structured, possibly translatable message.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Text {
    /// Literal text, shown as-is.
    Plain(Arc<str>),
    /// A translation key with positional arguments.
    ///
    /// `fallback` is an English template with `%s` placeholders used when
    /// the renderer has no translation for `key`.
    Translatable {
        /// Translation key, e.g. `parsing.quote.expected.end`.
        key: Arc<str>,
        /// Template used when no translation is known.
        fallback: Option<Arc<str>>,
        /// Arguments substituted into `%s` placeholders, in order.
        args: Vec<Text>,
    },
    /// Several parts rendered back to back.
    Group(Vec<Text>),
}

impl Text {
    /// Creates literal text.
    #[must_use]
    pub fn plain(text: impl Into<Arc<str>>) -> Self {
        Self::Plain(text.into())
    }

    /// Creates a translatable message with no fallback.
    #[must_use]
    pub fn translatable(key: impl Into<Arc<str>>) -> Self {
        Self::Translatable {
            key: key.into(),
            fallback: None,
            args: Vec::new(),
        }
    }

    /// Creates a translatable message with an English fallback template.
    #[must_use]
    pub fn translatable_with(
        key: impl Into<Arc<str>>,
        fallback: impl Into<Arc<str>>,
        args: Vec<Text>,
    ) -> Self {
        Self::Translatable {
            key: key.into(),
            fallback: Some(fallback.into()),
            args,
        }
    }

    /// A line break.
    #[must_use]
    pub fn newline() -> Self {
        Self::Plain("\n".into())
    }

    /// Joins several texts with line breaks.
    #[must_use]
    pub fn lines(parts: impl IntoIterator<Item = Text>) -> Self {
        let mut group = Vec::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                group.push(Self::newline());
            }
            group.push(part);
        }
        Self::Group(group)
    }

    /// Returns the translation key if this is a translatable message.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Translatable { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Renders this text with the default [`PlainRenderer`].
    #[must_use]
    pub fn to_plain(&self) -> String {
        PlainRenderer.render_plain(self)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain())
    }
}

impl NativeType for Text {
    const TYPE_NAME: &'static str = "Text";
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::plain(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::plain(s)
    }
}

/// Turns structured text into plain text.
///
/// This is the host's localization hook. Implementations must be cheap to
/// share between threads.
pub trait TextRenderer: Send + Sync {
    /// Looks up a translation template for `key`.
    fn translation(&self, key: &str) -> Option<&str>;

    /// Renders `text` to a plain string.
    fn render_plain(&self, text: &Text) -> String {
        let mut out = String::new();
        render_into(self, text, &mut out);
        out
    }
}

fn render_into<R: TextRenderer + ?Sized>(renderer: &R, text: &Text, out: &mut String) {
    match text {
        Text::Plain(s) => out.push_str(s),
        Text::Group(parts) => {
            for part in parts {
                render_into(renderer, part, out);
            }
        }
        Text::Translatable {
            key,
            fallback,
            args,
        } => {
            let template = renderer
                .translation(key)
                .or(fallback.as_deref())
                .unwrap_or(&**key);
            let rendered: Vec<String> = args.iter().map(|a| renderer.render_plain(a)).collect();
            substitute(template, &rendered, out);
        }
    }
}

/// Replaces `%s` placeholders in order. `%%` is a literal percent sign.
fn substitute(template: &str, args: &[String], out: &mut String) {
    let mut args = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                if let Some(arg) = args.next() {
                    out.push_str(arg);
                }
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
}

/// Renders fallbacks, or the bare key when there is none.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainRenderer;

impl TextRenderer for PlainRenderer {
    fn translation(&self, _key: &str) -> Option<&str> {
        None
    }
}

/// A renderer backed by a fixed translation table.
#[derive(Clone, Debug, Default)]
pub struct TranslationTable {
    entries: HashMap<String, String>,
}

impl TranslationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a translation, returning the table.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.entries.insert(key.into(), template.into());
        self
    }

    /// Adds a translation.
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }
}

impl TextRenderer for TranslationTable {
    fn translation(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}
