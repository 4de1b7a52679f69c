//! Completion suggestions.

use std::sync::Arc;

use arbor_foundation::{NativeType, Text};

/// A single replacement for part of the input.
#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
    /// Byte offset the replacement starts at.
    pub start: usize,
    /// Replacement text.
    pub text: String,
    /// Optional hover text.
    pub tooltip: Option<Text>,
}

/// A sorted, de-duplicated set of suggestions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Suggestions {
    list: Vec<Suggestion>,
}

impl Suggestions {
    /// No suggestions.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if there is nothing to suggest.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The suggestions, sorted case-insensitively.
    #[must_use]
    pub fn list(&self) -> &[Suggestion] {
        &self.list
    }

    /// Just the replacement texts.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.list.iter().map(|s| s.text.as_str()).collect()
    }

    /// Builds a sorted, de-duplicated set.
    #[must_use]
    pub fn create(mut list: Vec<Suggestion>) -> Self {
        list.sort_by(|a, b| {
            a.text
                .to_lowercase()
                .cmp(&b.text.to_lowercase())
                .then(a.start.cmp(&b.start))
        });
        list.dedup_by(|a, b| a.start == b.start && a.text == b.text);
        Self { list }
    }

    /// Merges several sets into one.
    #[must_use]
    pub fn merge(all: impl IntoIterator<Item = Suggestions>) -> Self {
        Self::create(all.into_iter().flat_map(|s| s.list).collect())
    }
}

impl NativeType for Suggestions {
    const TYPE_NAME: &'static str = "Suggestions";
}

/// Collects suggestions for the token starting at `start`.
#[derive(Clone, Debug)]
pub struct SuggestionsBuilder {
    input: Arc<str>,
    start: usize,
    remaining_lowercase: String,
    result: Vec<Suggestion>,
}

impl SuggestionsBuilder {
    /// Creates a builder completing `input` from `start`.
    #[must_use]
    pub fn new(input: impl Into<Arc<str>>, start: usize) -> Self {
        let input: Arc<str> = input.into();
        let start = start.min(input.len());
        let remaining_lowercase = input[start..].to_lowercase();
        Self {
            input,
            start,
            remaining_lowercase,
            result: Vec::new(),
        }
    }

    /// The full input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Where replacements start.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// The partial token being completed.
    #[must_use]
    pub fn remaining(&self) -> &str {
        &self.input[self.start..]
    }

    /// The partial token, lowercased.
    #[must_use]
    pub fn remaining_lowercase(&self) -> &str {
        &self.remaining_lowercase
    }

    /// Suggests `text` unless it equals what is already typed.
    pub fn suggest(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(text.into(), None)
    }

    /// Suggests `text` with a tooltip.
    pub fn suggest_with_tooltip(&mut self, text: impl Into<String>, tooltip: Text) -> &mut Self {
        self.push(text.into(), Some(tooltip))
    }

    /// Suggests `text` only if it starts with the typed prefix,
    /// ignoring case.
    pub fn suggest_matching(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if text.to_lowercase().starts_with(&self.remaining_lowercase) {
            self.push(text, None);
        }
        self
    }

    fn push(&mut self, text: String, tooltip: Option<Text>) -> &mut Self {
        if text != self.remaining() {
            self.result.push(Suggestion {
                start: self.start,
                text,
                tooltip,
            });
        }
        self
    }

    /// Adds everything from `other`.
    pub fn add(&mut self, other: &SuggestionsBuilder) -> &mut Self {
        self.result.extend(other.result.iter().cloned());
        self
    }

    /// A fresh builder over the same input starting at `start`.
    #[must_use]
    pub fn create_offset(&self, start: usize) -> Self {
        Self::new(Arc::clone(&self.input), start)
    }

    /// Returns the collected suggestions.
    #[must_use]
    pub fn build(&self) -> Suggestions {
        Suggestions::create(self.result.clone())
    }
}

impl NativeType for SuggestionsBuilder {
    const TYPE_NAME: &'static str = "SuggestionsBuilder";
}
