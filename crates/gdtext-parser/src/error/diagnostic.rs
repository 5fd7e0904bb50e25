//! The core diagnostic type for the gdtext error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, labeled source spans, and help text.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// warning[E100]: `node` declaration is missing required attribute `name`
///   --> level.tscn:7:1
///    |
///  7 | [node type="Sprite2D" parent="."]
///    | ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ declaration dropped
///    |
///    = help: add `name="..."` to the declaration
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create a warning diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use gdtext_parser::error::{Diagnostic, ErrorCode};
    /// # use gdtext_parser::Span;
    ///
    /// let diag = Diagnostic::warning("property outside of a node or sub-resource")
    ///     .with_code(ErrorCode::E102)
    ///     .with_label(Span::new(0..12), "ignored")
    ///     .with_help("move the property below a `[node ...]` header");
    /// ```
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Raise the diagnostic to [`Severity::Error`].
    ///
    /// Readers only report warnings; a diagnostic becomes an error when the
    /// document it belongs to is refused.
    pub fn escalate(mut self) -> Self {
        self.severity = Severity::Error;
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "warning[E100]: message" or "warning: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Warning, "unrecognized line");

        assert!(diag.severity().is_warning());
        assert_eq!(diag.message(), "unrecognized line");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_with_labels() {
        let diag = Diagnostic::warning("node `Sprite` is declared more than once")
            .with_code(ErrorCode::E101)
            .with_label(Span::new(40..60), "ignored duplicate")
            .with_secondary_label(Span::new(10..30), "first declared here");

        assert_eq!(diag.code(), Some(ErrorCode::E101));
        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(diag.labels()[1].is_secondary());
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::warning("missing `name`").with_code(ErrorCode::E100);

        assert_eq!(diag.to_string(), "warning[E100]: missing `name`");
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("scene rejected").escalate();

        assert!(diag.severity().is_error());
        assert_eq!(diag.to_string(), "error: scene rejected");
    }
}
