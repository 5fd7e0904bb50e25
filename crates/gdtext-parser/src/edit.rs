//! Byte-range edits applied to source text.

use log::trace;

use crate::span::Span;

/// A set of non-overlapping replacements over one source text.
///
/// Text outside the edited spans is copied through unchanged.
#[derive(Debug, Default)]
pub(crate) struct Edits {
    edits: Vec<(Span, String)>,
}

impl Edits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `span` with `text`.
    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push((span, text.into()));
    }

    /// Inserts `text` at byte `at`.
    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(Span::new(at..at), text);
    }

    pub fn delete(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies the edits to `source`.
    ///
    /// Insertions at the same offset keep the order they were added in. An
    /// edit overlapping one that starts earlier is skipped.
    pub fn apply(mut self, source: &str) -> String {
        self.edits.sort_by_key(|(span, _)| span.start());

        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;
        for (span, text) in self.edits {
            if span.start() < cursor {
                trace!(span = span.to_string(); "Skipped overlapping edit");
                continue;
            }
            output.push_str(&source[cursor..span.start()]);
            output.push_str(&text);
            cursor = span.end();
        }
        output.push_str(&source[cursor..]);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_in_offset_order() {
        let mut edits = Edits::new();
        edits.replace(Span::new(6..11), "there");
        edits.insert(0, ">> ");
        edits.delete(Span::new(5..6));

        assert_eq!(edits.apply("hello world!"), ">> hellothere!");
    }

    #[test]
    fn test_insertions_at_same_offset_keep_order() {
        let mut edits = Edits::new();
        edits.insert(1, "b");
        edits.insert(1, "c");

        assert_eq!(edits.apply("ad"), "abcd");
    }

    #[test]
    fn test_overlapping_edit_is_skipped() {
        let mut edits = Edits::new();
        edits.delete(Span::new(0..4));
        edits.replace(Span::new(2..6), "x");

        assert_eq!(edits.apply("abcdefg"), "efg");
    }

    #[test]
    fn test_no_edits() {
        let edits = Edits::new();
        assert!(edits.is_empty());
        assert_eq!(edits.apply("unchanged"), "unchanged");
    }
}
