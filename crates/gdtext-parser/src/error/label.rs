//! Labeled source spans for diagnostic messages.
//!
//! A label associates a message with a span in the source text, pointing
//! at the declaration or attribute a diagnostic talks about.

use crate::span::Span;

/// A labeled span in source text.
///
/// # Primary vs Secondary Labels
///
/// - **Primary labels** mark the declaration the diagnostic is about.
/// - **Secondary labels** add context, such as "first declared here" for a
///   duplicated node.
///
/// # Example
///
/// ```text
/// warning[E101]: node `Sprite` under `.` is declared more than once
///   --> player.tscn:9:1
///    |
///  9 | [node name="Sprite" type="Sprite2D" parent="."]
///    | ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ ignored duplicate
///    |
///  5 | [node name="Sprite" type="Sprite2D" parent="."]
///    | ----------------------------------------------- first declared here
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label() {
        let label = Label::primary(Span::new(10..20), "declared here");

        assert_eq!(label.span(), Span::new(10..20));
        assert_eq!(label.message(), "declared here");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
    }

    #[test]
    fn test_secondary_label() {
        let label = Label::secondary(Span::new(5..15), "first declared here");

        assert_eq!(label.span().start(), 5);
        assert_eq!(label.span().end(), 15);
        assert!(label.is_secondary());
    }
}
