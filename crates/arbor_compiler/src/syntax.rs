//! Usage documentation collected while compiling.
//!
//! Every node with a description produces one [`SyntaxEntry`]. After a
//! command registers, its entries are handed to the [`SyntaxSink`] so a
//! host can build help listings.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use arbor_dispatch::{CommandSource, Requirement};
use arbor_foundation::Text;

/// One line of usage help.
#[derive(Clone)]
pub struct SyntaxEntry {
    /// The root command's name.
    pub command: String,
    /// Class name of the handler that declared the command.
    pub class: String,
    /// Usage path below the root, e.g. `<player> kill`. Empty for the root.
    pub usage: String,
    /// The node's description.
    pub description: Text,
    /// Everything a source must pass to reach the node.
    pub condition: Option<Requirement>,
}

impl SyntaxEntry {
    /// Returns true if `source` may see this entry.
    #[must_use]
    pub fn visible_to(&self, source: &dyn CommandSource) -> bool {
        self.condition.as_ref().is_none_or(|c| c.test(source))
    }
}

impl fmt::Debug for SyntaxEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxEntry")
            .field("command", &self.command)
            .field("class", &self.class)
            .field("usage", &self.usage)
            .field("description", &self.description.to_plain())
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

impl fmt::Display for SyntaxEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.command)?;
        if !self.usage.is_empty() {
            write!(f, " {}", self.usage)?;
        }
        write!(f, " - {}", self.description.to_plain())
    }
}

/// Receives usage entries after a command registers.
pub trait SyntaxSink: Send + Sync {
    /// Accepts one entry.
    fn accept(&self, entry: SyntaxEntry);
}

/// A sink that keeps every entry.
#[derive(Debug, Default)]
pub struct SyntaxCollector {
    entries: Mutex<Vec<SyntaxEntry>>,
}

impl SyntaxCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything accepted so far.
    #[must_use]
    pub fn entries(&self) -> Vec<SyntaxEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries of `command` visible to `source`, formatted one per line.
    #[must_use]
    pub fn help(&self, command: &str, source: &dyn CommandSource) -> Vec<String> {
        self.entries()
            .iter()
            .filter(|e| e.command == command && e.visible_to(source))
            .map(ToString::to_string)
            .collect()
    }
}

impl SyntaxSink for SyntaxCollector {
    fn accept(&self, entry: SyntaxEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}
