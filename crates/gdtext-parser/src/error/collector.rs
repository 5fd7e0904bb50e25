//! Collector for accumulating diagnostics while reading a document.
//!
//! Readers never stop at the first problem; they report it to a
//! [`DiagnosticCollector`] and keep going.

use log::debug;

use crate::error::Diagnostic;

/// A collector for accumulating diagnostics during a read.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        debug!(diagnostic = diagnostic.to_string(); "Diagnostic emitted");
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection and return everything that was emitted.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_collector_new_finish_empty() {
        let collector = DiagnosticCollector::new();
        assert!(collector.finish().is_empty());
    }

    #[test]
    fn test_collector_keeps_order() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("first").with_code(ErrorCode::E002));
        collector.emit(
            Diagnostic::warning("second")
                .with_code(ErrorCode::E100)
                .with_label(Span::new(10..20), "here"),
        );

        let diagnostics = collector.finish();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].message(), "first");
        assert_eq!(diagnostics[1].code(), Some(ErrorCode::E100));
    }
}
