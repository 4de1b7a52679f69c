//! Recoverable results of the semantic stages.
//!
//! Lexing and parsing stop at the first error. Everything after that
//! produces a [`Resolved`] value instead: a failure is recorded in the
//! [`Diagnostics`] and compilation carries on with a placeholder, so one run
//! reports every problem in the input.

use thiserror::Error;

use crate::diagnostics::Diagnostics;

/// A positioned semantic failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    /// Byte offset in the command input, if known.
    pub position: Option<usize>,
    /// What went wrong.
    pub message: String,
}

impl Failure {
    /// A failure without a position.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            position: None,
            message: message.into(),
        }
    }

    /// A failure at `position`.
    #[must_use]
    pub fn at(position: usize, message: impl Into<String>) -> Self {
        Self {
            position: Some(position),
            message: message.into(),
        }
    }

    /// Fills in `position` if the failure has none yet.
    #[must_use]
    pub fn or_at(mut self, position: Option<usize>) -> Self {
        if self.position.is_none() {
            self.position = position;
        }
        self
    }
}

/// Result of a semantic stage.
pub type Resolved<T> = std::result::Result<T, Failure>;

/// Reporting helpers for [`Resolved`].
pub trait ResolvedExt<T> {
    /// Records a failure as an error and returns the value if there was one.
    fn report(self, diagnostics: &mut Diagnostics) -> Option<T>;

    /// Like [`ResolvedExt::report`], substituting `fallback` on failure.
    fn report_or(self, diagnostics: &mut Diagnostics, fallback: T) -> T;
}

impl<T> ResolvedExt<T> for Resolved<T> {
    fn report(self, diagnostics: &mut Diagnostics) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(failure) => {
                diagnostics.failure(failure);
                None
            }
        }
    }

    fn report_or(self, diagnostics: &mut Diagnostics, fallback: T) -> T {
        self.report(diagnostics).unwrap_or(fallback)
    }
}

/// Reports every failure in `results`, returning the successes in order.
pub fn report_all<T>(
    results: impl IntoIterator<Item = Resolved<T>>,
    diagnostics: &mut Diagnostics,
) -> Vec<T> {
    results
        .into_iter()
        .filter_map(|r| r.report(diagnostics))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_at_keeps_existing_position() {
        assert_eq!(Failure::at(3, "x").or_at(Some(9)).position, Some(3));
        assert_eq!(Failure::new("x").or_at(Some(9)).position, Some(9));
    }

    #[test]
    fn report_records_failures_only() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(Ok::<_, Failure>(1).report(&mut diagnostics), Some(1));
        assert!(diagnostics.is_empty());

        let failed: Resolved<i32> = Err(Failure::at(4, "bad"));
        assert_eq!(failed.report_or(&mut diagnostics, -1), -1);
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn report_all_keeps_order() {
        let mut diagnostics = Diagnostics::new();
        let values = report_all(
            vec![Ok(1), Err(Failure::new("a")), Ok(3), Err(Failure::new("b"))],
            &mut diagnostics,
        );
        assert_eq!(values, vec![1, 3]);
        assert_eq!(diagnostics.error_count(), 2);
    }
}
