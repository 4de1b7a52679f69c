//! Errors and warnings collected while compiling one command.

use std::fmt;

use arbor_language::format_error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::result::Failure;

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    /// Compilation fails.
    #[default]
    Error,
    /// Informative only.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("Error"),
            Self::Warning => f.write_str("Warning"),
        }
    }
}

/// One error or warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// Byte offset in the command input.
    pub position: Option<usize>,
    /// Unformatted message.
    pub message: String,
}

impl Diagnostic {
    /// Formats the message with source context from `input`.
    #[must_use]
    pub fn format(&self, input: &str) -> String {
        format_error(input, self.position, &self.message)
    }
}

/// Collects diagnostics in the order they are raised.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn push(&mut self, severity: Severity, position: Option<usize>, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity,
            position,
            message: message.into(),
        });
    }

    /// Records an error.
    pub fn error(&mut self, position: Option<usize>, message: impl Into<String>) {
        self.push(Severity::Error, position, message);
    }

    /// Records a warning.
    pub fn warning(&mut self, position: Option<usize>, message: impl Into<String>) {
        self.push(Severity::Warning, position, message);
    }

    /// Records a failure as an error.
    pub fn failure(&mut self, failure: Failure) {
        self.error(failure.position, failure.message);
    }

    /// All diagnostics, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    /// Returns true if at least one error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// The full report for command `name`, with every entry formatted
    /// against `input`.
    #[must_use]
    pub fn render(&self, input: &str, name: &str) -> String {
        let mut out = format!(
            "Errors/Warnings during compilation of command '{name}' ({} total warnings/errors)",
            self.entries.len()
        );
        for entry in &self.entries {
            out.push_str("\n\n");
            out.push_str(&entry.severity.to_string());
            out.push_str(": ");
            out.push_str(&entry.format(input));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut d = Diagnostics::new();
        d.error(None, "a");
        d.warning(Some(0), "b");
        d.warning(None, "c");
        assert_eq!(d.error_count(), 1);
        assert_eq!(d.warning_count(), 2);
        assert!(d.has_errors());
    }

    #[test]
    fn warnings_alone_are_not_errors() {
        let mut d = Diagnostics::new();
        d.warning(None, "w");
        assert!(!d.has_errors());
        assert!(!d.is_empty());
    }

    #[test]
    fn report_layout() {
        let input = "name = 'x'\nexecutes = run()";
        let mut d = Diagnostics::new();
        d.error(Some(22), "No method named 'run' found in Handler");
        d.warning(None, "No CommandSource or CommandContext parameters set");
        assert_eq!(
            d.render(input, "x"),
            "Errors/Warnings during compilation of command 'x' (2 total warnings/errors)\n\
             \n\
             Error: No method named 'run' found in Handler\n\
             executes = run()\n           ^ Line 2 Column 12\n\
             \n\
             Warning: No CommandSource or CommandContext parameters set"
        );
    }
}
