//! Severity levels for diagnostics.

use std::fmt;

/// The severity level of a diagnostic.
///
/// The readers are lenient and only ever emit [`Severity::Warning`]: the
/// offending declaration is dropped and reading continues. A refused
/// document's diagnostics are escalated to [`Severity::Error`] by
/// [`ParseError`](crate::error::ParseError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The input cannot be used.
    Error,

    /// Part of the input was ignored or replaced by a default.
    Warning,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}
