//! Line classification shared by the readers and the patchers.
//!
//! Both file formats are line oriented: a section starts with a bracketed
//! header line and continues with `key = value` property lines. The only
//! construct that spans several physical lines is a property value with an
//! open group or string, such as an input-action dictionary. [`scan`] folds
//! those into one logical [`Line`] and records byte spans, so that patchers
//! can rewrite a single line without touching the rest of the text.

use log::trace;

use crate::{
    attributes::{Attribute, Balance, parse_attributes},
    span::Span,
};

/// A logical line of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line content, without its line terminator.
    pub span: Span,
    /// The line including its terminator, if any.
    pub extent: Span,
    pub kind: LineKind<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Nothing but whitespace.
    Blank,
    /// First non-blank character is `;`.
    Comment,
    Header(Header<'a>),
    Property(Property<'a>),
    /// Neither of the above.
    Unknown,
}

/// A `[tag key=value ...]` section header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    /// The first word inside the brackets.
    pub tag: &'a str,
    /// Everything between the brackets.
    pub inner: &'a str,
    pub attributes: Vec<Attribute<'a>>,
    /// Whether the closing `]` was found.
    pub closed: bool,
}

impl<'a> Header<'a> {
    /// Returns the first attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&Attribute<'a>> {
        self.attributes.iter().find(|attribute| attribute.key == key)
    }

    /// Returns the unquoted value of the first attribute named `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.attribute(key).map(|attribute| attribute.value.as_str())
    }
}

/// A `key = value` line, possibly continued over following lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property<'a> {
    pub key: &'a str,
    /// The trimmed value text.
    pub value: &'a str,
    /// Location of `value`; empty and positioned after `=` for empty values.
    pub value_span: Span,
}

impl<'a> Line<'a> {
    /// Returns the header, if this is a header line.
    pub fn header(&self) -> Option<&Header<'a>> {
        match &self.kind {
            LineKind::Header(header) => Some(header),
            _ => None,
        }
    }

    /// Returns the property, if this is a property line.
    pub fn property(&self) -> Option<&Property<'a>> {
        match &self.kind {
            LineKind::Property(property) => Some(property),
            _ => None,
        }
    }

    /// Whether the line is blank.
    pub fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Blank)
    }
}

/// Splits `source` into classified logical lines.
///
/// # Example
///
/// ```
/// # use gdtext_parser::lines::{LineKind, scan};
/// let lines = scan("[input]\njump={\n\"deadzone\": 0.5\n}\n");
///
/// assert_eq!(lines.len(), 2);
/// assert!(matches!(lines[0].kind, LineKind::Header(_)));
/// assert_eq!(lines[1].property().unwrap().value, "{\n\"deadzone\": 0.5\n}");
/// ```
pub fn scan(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;

    while offset < source.len() {
        let physical = physical_line(source, offset);
        let line = classify(source, physical);
        trace!(span = line.span.to_string(); "Scanned line");
        offset = line.extent.end();
        lines.push(line);
    }

    lines
}

/// The physical line starting at `start`: `(content, extent)`.
fn physical_line(source: &str, start: usize) -> (Span, Span) {
    let rest = &source[start..];
    let (content_len, extent_len) = match rest.find('\n') {
        Some(newline) => {
            let content = rest[..newline].strip_suffix('\r').map_or(newline, str::len);
            (content, newline + 1)
        }
        None => (rest.len(), rest.len()),
    };
    (
        Span::new(start..start + content_len),
        Span::new(start..start + extent_len),
    )
}

fn classify(source: &str, (span, extent): (Span, Span)) -> Line<'_> {
    let content = &source[span.range()];
    let trimmed = content.trim_start();
    let indent = content.len() - trimmed.len();

    let kind = if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed.starts_with(';') {
        LineKind::Comment
    } else if trimmed.starts_with('[') {
        LineKind::Header(header(trimmed, span.start() + indent))
    } else {
        return property(source, span, extent).unwrap_or(Line {
            span,
            extent,
            kind: LineKind::Unknown,
        });
    };

    Line { span, extent, kind }
}

/// Parses a header whose `[` is at byte `start`.
fn header(text: &str, start: usize) -> Header<'_> {
    let text = text.trim_end();
    let (inner, closed) = match text[1..].strip_suffix(']') {
        Some(inner) => (inner, true),
        None => (&text[1..], false),
    };

    let tag_len = inner.find(char::is_whitespace).unwrap_or(inner.len());
    let tag = &inner[..tag_len];
    let attributes = parse_attributes(&inner[tag_len..], start + 1 + tag_len);

    Header {
        tag,
        inner,
        attributes,
        closed,
    }
}

/// Parses a property starting on the line `span`, following continuation
/// lines while the value has open groups.
fn property(source: &str, span: Span, extent: Span) -> Option<Line<'_>> {
    let content = &source[span.range()];
    let equals = content.find('=')?;
    let key = content[..equals].trim();
    if key.is_empty() {
        return None;
    }

    let value_start = span.start() + equals + 1;
    let mut balance = Balance::default();
    balance.feed_str(&source[value_start..span.end()]);

    let (mut last_span, mut last_extent) = (span, extent);
    while !balance.is_closed() {
        if last_extent.end() >= source.len() {
            // Never balanced: the property is just its first line.
            last_span = span;
            last_extent = extent;
            break;
        }
        let (next_span, next_extent) = physical_line(source, last_extent.end());
        balance.feed('\n');
        balance.feed_str(&source[next_span.range()]);
        last_span = next_span;
        last_extent = next_extent;
    }

    let raw_value = &source[value_start..last_span.end()];
    let leading = raw_value.len() - raw_value.trim_start().len();
    let value = raw_value.trim();
    let value_span = Span::new(value_start + leading..value_start + leading + value.len());

    Some(Line {
        span: span.union(last_span),
        extent: extent.union(last_extent),
        kind: LineKind::Property(Property {
            key,
            value,
            value_span,
        }),
    })
}
