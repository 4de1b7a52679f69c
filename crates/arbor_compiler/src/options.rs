//! Registration settings.

use arbor_language::{DefaultExecutesRule, ParseOptions};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::diagnostics::Severity;

/// Settings shared by every registration of a [`Registrar`](crate::Registrar).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistrarOptions {
    /// Permission given to commands that declare none. `{command}` is
    /// replaced by the command name.
    pub default_permission_format: Option<String>,
    /// Action injected into roots without one: `@variable` or a method name.
    pub default_executes: Option<String>,
    /// When the default action applies.
    pub default_rule: DefaultExecutesRule,
    /// Log each warning.
    pub warnings_enabled: bool,
    /// Treat warnings as fatal.
    pub fail_on_warnings: bool,
    /// How a name read from a mutable field is reported.
    pub mutable_name_field_severity: Severity,
}

impl Default for RegistrarOptions {
    fn default() -> Self {
        Self {
            default_permission_format: None,
            default_executes: None,
            default_rule: DefaultExecutesRule::default(),
            warnings_enabled: true,
            fail_on_warnings: false,
            mutable_name_field_severity: Severity::Warning,
        }
    }
}

impl RegistrarOptions {
    /// Sets the default permission format, e.g. `"server.commands.{command}"`.
    #[must_use]
    pub fn with_default_permission(mut self, format: impl Into<String>) -> Self {
        self.default_permission_format = Some(format.into());
        self
    }

    /// Sets the default action reference.
    #[must_use]
    pub fn with_default_executes(mut self, reference: impl Into<String>) -> Self {
        self.default_executes = Some(reference.into());
        self
    }

    /// Sets when the default action applies.
    #[must_use]
    pub const fn with_default_rule(mut self, rule: DefaultExecutesRule) -> Self {
        self.default_rule = rule;
        self
    }

    /// Enables or disables warning logs.
    #[must_use]
    pub const fn with_warnings(mut self, enabled: bool) -> Self {
        self.warnings_enabled = enabled;
        self
    }

    /// Makes warnings fatal.
    #[must_use]
    pub const fn with_fail_on_warnings(mut self, fail: bool) -> Self {
        self.fail_on_warnings = fail;
        self
    }

    /// Sets how names read from mutable fields are reported.
    #[must_use]
    pub const fn with_mutable_name_field_severity(mut self, severity: Severity) -> Self {
        self.mutable_name_field_severity = severity;
        self
    }

    /// The parser settings these options imply.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        let options = ParseOptions::default().with_default_rule(self.default_rule);
        match &self.default_executes {
            Some(reference) => options.with_default_executes(reference.clone()),
            None => options,
        }
    }
}
