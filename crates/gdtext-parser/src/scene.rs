//! Reader for scene text.
//!
//! The reader walks the logical lines of a scene and builds a
//! [`SceneDocument`]. It never fails: declarations that lack required
//! attributes are dropped, property lines outside of any node or
//! sub-resource are ignored, and unknown section tags close the current
//! entity. Each such decision is reported as a warning [`Diagnostic`].

use std::collections::HashMap;

use gdtext_core::{
    scene::{Connection, ExtResource, SceneDocument, SceneHeader, SceneNode, SubResource},
    value::{self, Value},
};
use log::debug;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    lines::{Header, Line, LineKind, scan},
    span::Span,
};

/// Parses scene text, discarding diagnostics.
///
/// # Example
///
/// ```
/// # use gdtext_parser::parse_scene;
/// let doc = parse_scene("[gd_scene format=3]\n\n[node name=\"Root\" type=\"Node2D\"]\n");
///
/// assert_eq!(doc.nodes.len(), 1);
/// assert_eq!(doc.nodes[0].name, "Root");
/// assert_eq!(doc.nodes[0].parent, None);
/// assert_eq!(doc.nodes[0].type_name.as_deref(), Some("Node2D"));
/// ```
pub fn parse_scene(source: &str) -> SceneDocument {
    parse_scene_with_diagnostics(source).0
}

/// Parses scene text and reports everything that was dropped or defaulted.
pub fn parse_scene_with_diagnostics(source: &str) -> (SceneDocument, Vec<Diagnostic>) {
    let mut reader = SceneReader::new(source);
    for line in scan(source) {
        reader.line(line);
    }
    reader.finish()
}

/// The entity property lines are currently added to.
enum Open {
    /// No entity; properties here are misplaced.
    Nothing,
    Node(SceneNode, Span),
    SubResource(SubResource),
    /// A dropped declaration or an unknown section; properties are ignored.
    Ignored,
}

struct SceneReader {
    doc: SceneDocument,
    collector: DiagnosticCollector,
    open: Open,
    /// Where each kept `(parent, name)` pair was declared.
    declared: HashMap<(Option<String>, String), Span>,
}

impl SceneReader {
    fn new(source: &str) -> Self {
        Self {
            doc: SceneDocument {
                raw: source.to_string(),
                ..SceneDocument::default()
            },
            collector: DiagnosticCollector::new(),
            open: Open::Nothing,
            declared: HashMap::new(),
        }
    }

    fn line(&mut self, line: Line<'_>) {
        match line.kind {
            LineKind::Blank | LineKind::Comment => {}
            LineKind::Header(header) => {
                self.close();
                if !header.closed {
                    self.collector.emit(
                        Diagnostic::warning(format!(
                            "`{}` header is missing its closing `]`",
                            header.tag
                        ))
                        .with_code(ErrorCode::E001)
                        .with_label(line.span, "unterminated header"),
                    );
                }
                self.open = self.header(&header, line.span);
            }
            LineKind::Property(property) => match &mut self.open {
                Open::Node(node, _) => {
                    node.properties
                        .insert(property.key.to_string(), property.value.to_string());
                }
                Open::SubResource(resource) => {
                    resource
                        .properties
                        .insert(property.key.to_string(), property.value.to_string());
                }
                Open::Ignored => {}
                Open::Nothing => self.collector.emit(
                    Diagnostic::warning(format!(
                        "property `{}` is outside of a node or sub-resource",
                        property.key
                    ))
                    .with_code(ErrorCode::E102)
                    .with_label(line.span, "ignored")
                    .with_help("move the property below a `[node ...]` or `[sub_resource ...]` header"),
                ),
            },
            LineKind::Unknown => self.collector.emit(
                Diagnostic::warning("unrecognized line")
                    .with_code(ErrorCode::E002)
                    .with_label(line.span, "not a header or a `key = value` property"),
            ),
        }
    }

    /// Handles a section header and returns what its properties belong to.
    fn header(&mut self, header: &Header<'_>, span: Span) -> Open {
        match header.tag {
            "gd_scene" => {
                self.doc.header = SceneHeader {
                    format: self
                        .integer(header, "format")
                        .unwrap_or(SceneHeader::default().format),
                    load_steps: self
                        .integer(header, "load_steps")
                        .unwrap_or(SceneHeader::default().load_steps),
                    uid: header.value("uid").map(str::to_string),
                };
                Open::Nothing
            }
            "ext_resource" => {
                if let Some([type_name, path, id]) =
                    self.required(header, span, ["type", "path", "id"])
                {
                    self.doc.ext_resources.push(ExtResource {
                        type_name,
                        uid: header.value("uid").map(str::to_string),
                        path,
                        id,
                    });
                }
                Open::Nothing
            }
            "sub_resource" => match self.required(header, span, ["type", "id"]) {
                Some([type_name, id]) => Open::SubResource(SubResource {
                    type_name,
                    id,
                    properties: Default::default(),
                }),
                None => Open::Ignored,
            },
            "node" => match self.required(header, span, ["name"]) {
                Some([name]) => {
                    let mut node =
                        SceneNode::new(name, header.value("parent").map(str::to_string));
                    node.type_name = header.value("type").map(str::to_string);
                    node.instance = header.value("instance").map(str::to_string);
                    node.groups = header
                        .attribute("groups")
                        .map(|groups| group_names(groups.raw))
                        .unwrap_or_default();
                    Open::Node(node, span)
                }
                None => Open::Ignored,
            },
            "connection" => {
                if let Some([signal, from, to, method]) =
                    self.required(header, span, ["signal", "from", "to", "method"])
                {
                    let mut connection = Connection::new(signal, from, to, method);
                    connection.flags = self.integer(header, "flags");
                    self.doc.connections.push(connection);
                }
                Open::Nothing
            }
            tag => {
                debug!(tag; "Ignoring section");
                Open::Ignored
            }
        }
    }

    /// Returns the values of all `keys`, or reports the first missing one.
    fn required<const N: usize>(
        &mut self,
        header: &Header<'_>,
        span: Span,
        keys: [&str; N],
    ) -> Option<[String; N]> {
        if let Some(missing) = keys.iter().find(|key| header.value(key).is_none()) {
            self.collector.emit(
                Diagnostic::warning(format!(
                    "`{}` declaration is missing required attribute `{missing}`",
                    header.tag
                ))
                .with_code(ErrorCode::E100)
                .with_label(span, "declaration dropped")
                .with_help(format!("add `{missing}=\"...\"` to the declaration")),
            );
            return None;
        }
        Some(keys.map(|key| header.value(key).unwrap_or_default().to_string()))
    }

    /// Parses an optional integer attribute, reporting values that are not.
    fn integer(&mut self, header: &Header<'_>, key: &str) -> Option<i64> {
        let attribute = header.attribute(key)?;
        match attribute.value.parse() {
            Ok(number) => Some(number),
            Err(_) => {
                self.collector.emit(
                    Diagnostic::warning(format!(
                        "`{key}` must be an integer, found `{}`",
                        attribute.raw
                    ))
                    .with_code(ErrorCode::E103)
                    .with_label(attribute.span, "ignored"),
                );
                None
            }
        }
    }

    /// Closes the open entity, keeping it when it is valid.
    fn close(&mut self) {
        match std::mem::replace(&mut self.open, Open::Nothing) {
            Open::Node(node, span) => {
                let key = (node.parent.clone(), node.name.clone());
                if let Some(first) = self.declared.get(&key) {
                    self.collector.emit(
                        Diagnostic::warning(format!(
                            "node `{}` under `{}` is declared more than once",
                            node.name,
                            node.parent.as_deref().unwrap_or("<root>")
                        ))
                        .with_code(ErrorCode::E101)
                        .with_label(span, "ignored duplicate")
                        .with_secondary_label(*first, "first declared here"),
                    );
                    return;
                }
                self.declared.insert(key, span);
                self.doc.nodes.push(node);
            }
            Open::SubResource(resource) => self.doc.sub_resources.push(resource),
            Open::Nothing | Open::Ignored => {}
        }
    }

    fn finish(mut self) -> (SceneDocument, Vec<Diagnostic>) {
        self.close();
        debug!(
            nodes = self.doc.nodes.len(),
            connections = self.doc.connections.len();
            "Parsed scene"
        );
        (self.doc, self.collector.finish())
    }
}

/// Group names from a `groups=[...]` attribute.
fn group_names(raw: &str) -> Vec<String> {
    match value::decode(raw) {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
