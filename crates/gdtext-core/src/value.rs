//! Property values and their text codec.
//!
//! Scene and settings documents keep every property as the raw expression
//! text found in the file. This module turns such an expression into a
//! [`Value`] ([`decode`]) and back ([`encode`], or simply [`ToString`]), and
//! maps loosely-typed JSON records onto values ([`Value::from_json`]).
//!
//! Decoding never fails: anything the grammar does not recognise is kept
//! verbatim as [`Value::Opaque`], so unknown constructors such as
//! `PackedVector2Array(...)` pass through untouched.
//!
//! # Example
//!
//! ```
//! # use gdtext_core::value::{Value, decode};
//! let value = decode("Vector2(16, -8.5)");
//! assert_eq!(value, Value::Vector2 { x: 16.0, y: -8.5 });
//! assert_eq!(value.to_string(), "Vector2(16, -8.5)");
//!
//! // Resource references stay as the call expression.
//! let texture = decode(r#"ExtResource("1_abc")"#);
//! assert_eq!(texture, Value::ResourceRef(r#"ExtResource("1_abc")"#.to_string()));
//! ```

use std::{fmt, ops::RangeInclusive};

use serde_json::json;
use winnow::{
    Parser as _,
    ascii::{digit1, float, multispace0},
    combinator::{alt, opt, preceded, separated, terminated},
    error::{ContextError, ErrMode, ModalResult},
};

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Null,
    Number(f64),
    String(String),
    Vector2 { x: f64, y: f64 },
    Vector3 { x: f64, y: f64, z: f64 },
    Color { r: f64, g: f64, b: f64, a: f64 },
    Rect2 { x: f64, y: f64, w: f64, h: f64 },
    NodePath(String),
    /// An `ExtResource(...)` or `SubResource(...)` call, kept as written.
    ResourceRef(String),
    Array(Vec<Value>),
    /// Any expression the codec does not understand, trimmed.
    Opaque(String),
}

impl Value {
    /// Returns the boolean payload, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric payload, if this is a [`Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text payload of strings and node paths.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) | Value::NodePath(value) => Some(value),
            _ => None,
        }
    }

    /// Builds a value from loosely-typed JSON input.
    ///
    /// Objects are recognised by their keys, checked in this order:
    /// `x,y,w,h` is a [`Value::Rect2`], `x,y,z` a [`Value::Vector3`], `x,y` a
    /// [`Value::Vector2`] and `r,g,b` a [`Value::Color`] (alpha defaults to
    /// `1`). Objects of any other shape, or with non-numeric components, are
    /// kept as [`Value::Opaque`] JSON text.
    ///
    /// # Example
    ///
    /// ```
    /// # use gdtext_core::value::Value;
    /// let json = serde_json::json!({ "r": 1, "g": 0.5, "b": 0 });
    /// assert_eq!(
    ///     Value::from_json(&json),
    ///     Value::Color { r: 1.0, g: 0.5, b: 0.0, a: 1.0 }
    /// );
    /// ```
    pub fn from_json(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(value) => Value::Bool(*value),
            Json::Number(number) => number
                .as_f64()
                .map_or_else(|| Value::Opaque(number.to_string()), Value::Number),
            Json::String(text) => Value::String(text.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            Json::Object(record) => {
                record_value(record).unwrap_or_else(|| Value::Opaque(json.to_string()))
            }
        }
    }

    /// Converts the value into JSON, the inverse of [`Value::from_json`].
    ///
    /// Node paths, resource references and opaque expressions become their
    /// encoded text.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(value) => json!(value),
            Value::Null => serde_json::Value::Null,
            Value::Number(value) => serde_json::Number::from_f64(*value)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(text) => json!(text),
            Value::Vector2 { x, y } => json!({ "x": x, "y": y }),
            Value::Vector3 { x, y, z } => json!({ "x": x, "y": y, "z": z }),
            Value::Color { r, g, b, a } => json!({ "r": r, "g": g, "b": b, "a": a }),
            Value::Rect2 { x, y, w, h } => json!({ "x": x, "y": y, "w": w, "h": h }),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::NodePath(_) | Value::ResourceRef(_) | Value::Opaque(_) => {
                json!(self.to_string())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Null => f.write_str("null"),
            Value::Number(value) => write!(f, "{value}"),
            Value::String(text) => f.write_str(&quote(text)),
            Value::Vector2 { x, y } => write!(f, "Vector2({x}, {y})"),
            Value::Vector3 { x, y, z } => write!(f, "Vector3({x}, {y}, {z})"),
            Value::Color { r, g, b, a } => write!(f, "Color({r}, {g}, {b}, {a})"),
            Value::Rect2 { x, y, w, h } => write!(f, "Rect2({x}, {y}, {w}, {h})"),
            Value::NodePath(path) => write!(f, "NodePath({})", quote(path)),
            Value::Array(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::ResourceRef(text) | Value::Opaque(text) => f.write_str(text),
        }
    }
}

/// Decodes a raw property expression.
///
/// Recognised forms, first match wins: `true`/`false`, `null`, number
/// literals (`-?\d+(\.\d+)?`), quoted strings, `Vector2`, `Vector2i`
/// (truncated to integers), `Vector3`, `Color` (alpha defaults to `1`),
/// `Rect2`, `NodePath("...")`, `ExtResource(...)`/`SubResource(...)` and
/// bracketed arrays. Everything else is returned trimmed as
/// [`Value::Opaque`].
pub fn decode(text: &str) -> Value {
    let text = text.trim();

    if let Ok(value) = scalar.parse(text) {
        return value;
    }

    if let Some(inner) = text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        let inner = inner.trim();
        if inner.is_empty() {
            return Value::Array(Vec::new());
        }
        if let Some(items) = split_top_level(inner) {
            return Value::Array(items.into_iter().map(decode).collect());
        }
    }

    Value::Opaque(text.to_string())
}

/// Encodes a value as a property expression.
pub fn encode(value: &Value) -> String {
    value.to_string()
}

/// Wraps text in double quotes, escaping backslashes and double quotes.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Parses a single- or double-quoted string literal, resolving escapes.
///
/// This is a winnow parser so that the scene grammar can reuse it for
/// attribute values.
pub fn quoted_string(input: &mut &str) -> ModalResult<String> {
    let source: &str = *input;
    let mut chars = source.char_indices();
    let quote = match chars.next() {
        Some((_, c @ ('"' | '\''))) => c,
        _ => return Err(ErrMode::Backtrack(ContextError::new())),
    };

    let mut text = String::new();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => text.push(unescape(escaped)),
                None => break,
            },
            c if c == quote => {
                *input = &source[index + c.len_utf8()..];
                return Ok(text);
            }
            c => text.push(c),
        }
    }

    Err(ErrMode::Backtrack(ContextError::new()))
}

/// Splits `text` on commas that are not nested inside brackets, braces,
/// parentheses or quotes. Items are trimmed.
///
/// Returns `None` when the nesting is unbalanced.
pub fn split_top_level(text: &str) -> Option<Vec<&str>> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (index, c) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                items.push(text[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return None;
    }
    items.push(text[start..].trim());
    Some(items)
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}

fn record_value(record: &serde_json::Map<String, serde_json::Value>) -> Option<Value> {
    let has = |key: &str| record.contains_key(key);
    let number = |key: &str| record.get(key).and_then(serde_json::Value::as_f64);

    if has("x") && has("y") && has("w") && has("h") {
        Some(Value::Rect2 {
            x: number("x")?,
            y: number("y")?,
            w: number("w")?,
            h: number("h")?,
        })
    } else if has("x") && has("y") && has("z") {
        Some(Value::Vector3 {
            x: number("x")?,
            y: number("y")?,
            z: number("z")?,
        })
    } else if has("x") && has("y") {
        Some(Value::Vector2 {
            x: number("x")?,
            y: number("y")?,
        })
    } else if has("r") && has("g") && has("b") {
        let a = match record.get("a") {
            Some(alpha) => alpha.as_f64()?,
            None => 1.0,
        };
        Some(Value::Color {
            r: number("r")?,
            g: number("g")?,
            b: number("b")?,
            a,
        })
    } else {
        None
    }
}

fn scalar(input: &mut &str) -> ModalResult<Value> {
    alt((
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        "null".value(Value::Null),
        number.map(Value::Number),
        quoted_string.map(Value::String),
        constructor,
        node_path.map(Value::NodePath),
        resource_ref.map(|text: &str| Value::ResourceRef(text.to_string())),
    ))
    .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<f64> {
    (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .parse_to()
        .parse_next(input)
}

fn constructor(input: &mut &str) -> ModalResult<Value> {
    alt((
        call("Vector2", 2..=2).map(|args| Value::Vector2 {
            x: args[0],
            y: args[1],
        }),
        call("Vector2i", 2..=2).map(|args| Value::Vector2 {
            x: args[0].trunc(),
            y: args[1].trunc(),
        }),
        call("Vector3", 3..=3).map(|args| Value::Vector3 {
            x: args[0],
            y: args[1],
            z: args[2],
        }),
        call("Color", 3..=4).map(|args| Value::Color {
            r: args[0],
            g: args[1],
            b: args[2],
            a: args.get(3).copied().unwrap_or(1.0),
        }),
        call("Rect2", 4..=4).map(|args| Value::Rect2 {
            x: args[0],
            y: args[1],
            w: args[2],
            h: args[3],
        }),
    ))
    .parse_next(input)
}

/// `Name(n, n, ...)` with a number of float arguments within `arity`.
fn call<'s>(
    name: &'static str,
    arity: RangeInclusive<usize>,
) -> impl winnow::Parser<&'s str, Vec<f64>, ErrMode<ContextError>> {
    preceded(
        (name, multispace0, '(', multispace0),
        terminated(
            separated(arity, float_argument, (multispace0, ',', multispace0)),
            (multispace0, ')'),
        ),
    )
}

fn float_argument(input: &mut &str) -> ModalResult<f64> {
    float.parse_next(input)
}

fn node_path(input: &mut &str) -> ModalResult<String> {
    preceded(
        ("NodePath", multispace0, '(', multispace0),
        terminated(quoted_string, (multispace0, ')')),
    )
    .parse_next(input)
}

fn resource_ref<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        alt(("ExtResource", "SubResource")),
        multispace0,
        '(',
        multispace0,
        alt((quoted_string.void(), digit1.void())),
        multispace0,
        ')',
    )
        .take()
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_literals() {
        assert_eq!(decode("true"), Value::Bool(true));
        assert_eq!(decode(" false "), Value::Bool(false));
        assert_eq!(decode("null"), Value::Null);
        assert_eq!(decode("42"), Value::Number(42.0));
        assert_eq!(decode("-3.25"), Value::Number(-3.25));
        assert_eq!(decode(r#""hello""#), Value::String("hello".to_string()));
        assert_eq!(decode("'single'"), Value::String("single".to_string()));
    }

    #[test]
    fn test_decode_string_escapes() {
        assert_eq!(
            decode(r#""say \"hi\" \\ there""#),
            Value::String(r#"say "hi" \ there"#.to_string())
        );
    }

    #[test]
    fn test_decode_number_requires_plain_literal() {
        assert_eq!(decode("1e5"), Value::Opaque("1e5".to_string()));
        assert_eq!(decode("1.5.3"), Value::Opaque("1.5.3".to_string()));
        assert_eq!(decode(".5"), Value::Opaque(".5".to_string()));
    }

    #[test]
    fn test_decode_vectors() {
        assert_eq!(decode("Vector2(1, 2)"), Value::Vector2 { x: 1.0, y: 2.0 });
        assert_eq!(decode("Vector2i(3.9, -2.5)"), Value::Vector2 { x: 3.0, y: -2.0 });
        assert_eq!(
            decode("Vector3(0,1.5,-2)"),
            Value::Vector3 {
                x: 0.0,
                y: 1.5,
                z: -2.0
            }
        );
        assert_eq!(
            decode("Vector2(1e-05, 0)"),
            Value::Vector2 { x: 0.00001, y: 0.0 }
        );
    }

    #[test]
    fn test_decode_color_default_alpha() {
        assert_eq!(
            decode("Color(1, 0, 0)"),
            Value::Color {
                r: 1.0,
                g: 0.0,
                b: 0.0,
                a: 1.0
            }
        );
        assert_eq!(
            decode("Color(0.2, 0.4, 0.6, 0.5)"),
            Value::Color {
                r: 0.2,
                g: 0.4,
                b: 0.6,
                a: 0.5
            }
        );
    }

    #[test]
    fn test_decode_rect_and_node_path() {
        assert_eq!(
            decode("Rect2(0, 0, 64, 32)"),
            Value::Rect2 {
                x: 0.0,
                y: 0.0,
                w: 64.0,
                h: 32.0
            }
        );
        assert_eq!(
            decode(r#"NodePath("../Player/Sprite")"#),
            Value::NodePath("../Player/Sprite".to_string())
        );
    }

    #[test]
    fn test_decode_resource_refs_are_not_unwrapped() {
        assert_eq!(
            decode(r#"ExtResource("2_x7k")"#),
            Value::ResourceRef(r#"ExtResource("2_x7k")"#.to_string())
        );
        assert_eq!(
            decode("SubResource( 3 )"),
            Value::ResourceRef("SubResource( 3 )".to_string())
        );
    }

    #[test]
    fn test_decode_arrays() {
        assert_eq!(decode("[]"), Value::Array(Vec::new()));
        assert_eq!(decode("[ ]"), Value::Array(Vec::new()));
        assert_eq!(
            decode(r#"[1, "two", Vector2(3, 4), null]"#),
            Value::Array(vec![
                Value::Number(1.0),
                Value::String("two".to_string()),
                Value::Vector2 { x: 3.0, y: 4.0 },
                Value::Null,
            ])
        );
        assert_eq!(
            decode(r#"["a,b", "c"]"#),
            Value::Array(vec![
                Value::String("a,b".to_string()),
                Value::String("c".to_string()),
            ])
        );
    }

    #[test]
    fn test_decode_fallback_is_trimmed_input() {
        assert_eq!(
            decode("  PackedVector2Array(0, 0, 1, 1) "),
            Value::Opaque("PackedVector2Array(0, 0, 1, 1)".to_string())
        );
        assert_eq!(decode("Vector2(1)"), Value::Opaque("Vector2(1)".to_string()));
        assert_eq!(decode("trueish"), Value::Opaque("trueish".to_string()));
        assert_eq!(decode("[1, (2]"), Value::Opaque("[1, (2]".to_string()));
    }

    #[test]
    fn test_encode_formats() {
        assert_eq!(Value::Number(120.0).to_string(), "120");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(
            Value::Color {
                r: 1.0,
                g: 0.0,
                b: 0.0,
                a: 1.0
            }
            .to_string(),
            "Color(1, 0, 0, 1)"
        );
        assert_eq!(
            Value::Array(vec![Value::Bool(true), Value::String("x".to_string())]).to_string(),
            r#"[true, "x"]"#
        );
        assert_eq!(
            encode(&Value::NodePath("A/B".to_string())),
            r#"NodePath("A/B")"#
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("Vector2(1, 2), [3, 4], \"5, 6\""),
            Some(vec!["Vector2(1, 2)", "[3, 4]", "\"5, 6\""])
        );
        assert_eq!(split_top_level("(1, 2"), None);
        assert_eq!(split_top_level("1)"), None);
    }

    #[test]
    fn test_from_json_record_shapes() {
        assert_eq!(
            Value::from_json(&json!({ "x": 1, "y": 2, "w": 3, "h": 4 })),
            Value::Rect2 {
                x: 1.0,
                y: 2.0,
                w: 3.0,
                h: 4.0
            }
        );
        assert_eq!(
            Value::from_json(&json!({ "x": 1, "y": 2, "z": 3 })),
            Value::Vector3 {
                x: 1.0,
                y: 2.0,
                z: 3.0
            }
        );
        assert_eq!(
            Value::from_json(&json!({ "x": 1, "y": 2 })),
            Value::Vector2 { x: 1.0, y: 2.0 }
        );
        assert_eq!(
            Value::from_json(&json!({ "r": 1, "g": 1, "b": 1, "a": 0.25 })),
            Value::Color {
                r: 1.0,
                g: 1.0,
                b: 1.0,
                a: 0.25
            }
        );
        assert!(matches!(
            Value::from_json(&json!({ "name": "x" })),
            Value::Opaque(_)
        ));
        assert!(matches!(
            Value::from_json(&json!({ "x": "left", "y": 2 })),
            Value::Opaque(_)
        ));
    }

    #[test]
    fn test_json_round_trip_of_vector() {
        let value = Value::Vector3 {
            x: 1.0,
            y: -2.0,
            z: 0.5,
        };
        assert_eq!(Value::from_json(&value.to_json()), value);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn component() -> impl Strategy<Value = f64> {
        prop_oneof![
            (-100_000i32..100_000).prop_map(f64::from),
            (-1000.0f64..1000.0),
        ]
    }

    fn leaf_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            Just(Value::Null),
            component().prop_map(Value::Number),
            "[a-zA-Z0-9 _,\"\\\\/.-]{0,16}".prop_map(Value::String),
            (component(), component()).prop_map(|(x, y)| Value::Vector2 { x, y }),
            (component(), component(), component()).prop_map(|(x, y, z)| Value::Vector3 { x, y, z }),
            (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0)
                .prop_map(|(r, g, b, a)| Value::Color { r, g, b, a }),
            (component(), component(), component(), component())
                .prop_map(|(x, y, w, h)| Value::Rect2 { x, y, w, h }),
            "[A-Za-z_][A-Za-z0-9_/.]{0,12}".prop_map(Value::NodePath),
        ]
    }

    fn value() -> impl Strategy<Value = Value> {
        prop_oneof![
            3 => leaf_value(),
            1 => prop::collection::vec(leaf_value(), 0..5).prop_map(Value::Array),
        ]
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Every encodable value decodes back to itself.
    fn check_round_trip(value: &Value) -> Result<(), TestCaseError> {
        let text = encode(value);
        let decoded = decode(&text);
        prop_assert_eq!(&decoded, value, "round trip through `{}`", text);
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn encode_decode_round_trip(value in value()) {
            check_round_trip(&value)?;
        }
    }
}
