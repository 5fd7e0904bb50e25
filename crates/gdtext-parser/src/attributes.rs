//! Attribute lists of section headers.
//!
//! A header such as `[node name="Player" parent="." groups=["enemies"]]`
//! carries whitespace-separated `key=value` pairs after its tag. Values are
//! quoted strings, bracketed lists, call expressions such as
//! `ExtResource("1_abc")`, or bare tokens like `3`.
//!
//! Parsing is lenient: it stops at the first pair that does not fit the
//! grammar and keeps everything parsed before it.

use gdtext_core::value::quoted_string;
use winnow::{
    Parser as _,
    ascii::space0,
    combinator::{alt, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{Offset, Stream},
    token::{take_till, take_while},
};

use crate::span::Span;

/// One `key=value` pair of a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub key: &'a str,
    /// The value with string quotes and escapes resolved. Values that are
    /// not quoted strings are kept as written.
    pub value: String,
    /// The value exactly as written.
    pub raw: &'a str,
    /// Location of `raw` in the source text.
    pub span: Span,
}

/// Parses the attributes in `text`, which starts at byte `base` of the source.
///
/// # Example
///
/// ```
/// # use gdtext_parser::attributes::parse_attributes;
/// let attributes = parse_attributes(r#"name="Player" instance=ExtResource("1")"#, 0);
///
/// assert_eq!(attributes[0].key, "name");
/// assert_eq!(attributes[0].value, "Player");
/// assert_eq!(attributes[0].raw, r#""Player""#);
/// assert_eq!(attributes[1].value, r#"ExtResource("1")"#);
/// ```
pub fn parse_attributes(text: &str, base: usize) -> Vec<Attribute<'_>> {
    let mut attributes = Vec::new();
    let mut input = text;

    loop {
        input = input.trim_start();
        if input.is_empty() {
            break;
        }

        let key = match attribute_key.parse_next(&mut input) {
            Ok(key) => key,
            Err(_) => break,
        };
        let value_start = base + input.offset_from(&text);
        match attribute_value.parse_next(&mut input) {
            Ok((raw, value)) => attributes.push(Attribute {
                key,
                value,
                raw,
                span: Span::new(value_start..value_start + raw.len()),
            }),
            Err(_) => break,
        }
    }

    attributes
}

/// `key` followed by `=`, with optional spaces around the sign.
fn attribute_key<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    terminated(
        take_while(1.., |c: char| c.is_alphanumeric() || c == '_'),
        (space0, '=', space0),
    )
    .parse_next(input)
}

fn attribute_value<'s>(input: &mut &'s str) -> ModalResult<(&'s str, String)> {
    alt((
        quoted_string
            .with_taken()
            .map(|(value, raw): (String, &str)| (raw, value)),
        balanced.map(|raw: &str| (raw, raw.to_string())),
        call_expression.map(|raw: &str| (raw, raw.to_string())),
        bare_token.map(|raw: &str| (raw, raw.to_string())),
    ))
    .parse_next(input)
}

/// `Name(...)` with balanced parentheses.
fn call_expression<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        take_while(1.., |c: char| c.is_alphanumeric() || c == '_'),
        balanced,
    )
        .take()
        .parse_next(input)
}

fn bare_token<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_till(1.., |c: char| c.is_whitespace())
        .verify(|raw: &str| !raw.starts_with(['"', '\'']))
        .parse_next(input)
}

/// A bracketed, braced or parenthesised group, up to its matching closer.
///
/// Quoted strings inside the group may contain any bracket.
fn balanced<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    if !input.starts_with(['[', '{', '(']) {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }

    let source: &'s str = *input;
    let mut balance = Balance::default();
    for (index, c) in source.char_indices() {
        balance.feed(c);
        if balance.is_closed() {
            return Ok(input.next_slice(index + c.len_utf8()));
        }
    }

    Err(ErrMode::Backtrack(ContextError::new()))
}

/// Nesting state of a value expression: open groups and string quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Balance {
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Balance {
    pub(crate) fn feed(&mut self, c: char) {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == '"' {
                self.in_string = false;
            }
            return;
        }

        match c {
            '"' => self.in_string = true,
            '[' | '{' | '(' => self.depth += 1,
            ']' | '}' | ')' => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
    }

    pub(crate) fn feed_str(&mut self, text: &str) {
        text.chars().for_each(|c| self.feed(c));
    }

    /// No group or string is open.
    pub(crate) fn is_closed(&self) -> bool {
        self.depth == 0 && !self.in_string
    }
}
